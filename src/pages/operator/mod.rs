//! Operator View
//!
//! Collapsible sidebar over reminders, feedbacks, students and visit records.
//! Each section loads its list the first time it is shown; after that only
//! filters, pagers and refresh buttons reload it.

mod feedbacks;
mod reminders;
mod student_info;
mod students;
mod visits;

use leptos::prelude::*;

use super::{RoleGate, UserBar};
use crate::context::use_services;
use crate::models::{Role, StudentRef};
use crate::session::OPS_SIDEBAR_COLLAPSED_KEY;
use crate::store::{store_toggle_flag, use_ui_store, UiStateStoreFields};

use feedbacks::FeedbacksSection;
use reminders::RemindersSection;
use student_info::StudentInfoModal;
use students::StudentsSection;
use visits::VisitsSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Reminders,
    Feedbacks,
    Students,
    Visits,
}

impl Section {
    const ALL: [Section; 4] = [Section::Reminders, Section::Feedbacks, Section::Students, Section::Visits];

    fn label(&self) -> &'static str {
        match self {
            Section::Reminders => "提醒",
            Section::Feedbacks => "点评",
            Section::Students => "学员管理",
            Section::Visits => "回访记录",
        }
    }
}

/// Opens the student detail modal from any list
#[derive(Clone, Copy)]
pub(crate) struct StudentViewer {
    open: RwSignal<bool>,
    student: RwSignal<Option<String>>,
}

impl StudentViewer {
    fn new() -> Self {
        Self {
            open: RwSignal::new(false),
            student: RwSignal::new(None),
        }
    }

    pub(crate) fn show(&self, id: String) {
        self.student.set(Some(id));
        self.open.set(true);
    }
}

fn use_student_viewer() -> StudentViewer {
    expect_context::<StudentViewer>()
}

/// Student name that opens the detail modal when the id is known
#[component]
fn StudentLink(student: Option<StudentRef>, #[prop(into)] name: String) -> impl IntoView {
    let viewer = use_student_viewer();
    let id = student.as_ref().and_then(|s| s.id()).map(|id| id.to_string());
    match id {
        Some(id) => {
            let text = if name.is_empty() { format!("#{}", id) } else { name };
            view! {
                <a
                    href="#"
                    class="stu-link"
                    on:click=move |ev| {
                        ev.prevent_default();
                        viewer.show(id.clone());
                    }
                >
                    {text}
                </a>
            }
            .into_any()
        }
        None => view! { <span>{if name.is_empty() { "-".to_string() } else { name }}</span> }.into_any(),
    }
}

#[component]
pub fn OperatorPage() -> impl IntoView {
    view! {
        <RoleGate role=Role::Operator>
            <OperatorDashboard />
        </RoleGate>
    }
}

#[component]
fn OperatorDashboard() -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let active = RwSignal::new(Section::Reminders);
    let viewer = StudentViewer::new();
    provide_context(viewer);

    store.sidebar_collapsed().set(services.session().get_flag(OPS_SIDEBAR_COLLAPSED_KEY));

    let toggle_sidebar = move |_| {
        store_toggle_flag(store.sidebar_collapsed(), &services.session(), OPS_SIDEBAR_COLLAPSED_KEY);
    };
    let shown = move |section: Section| Signal::derive(move || active.get() == section);

    view! {
        <div class="operator-page" class:sidebar-collapsed=move || store.sidebar_collapsed().get()>
            <UserBar title="运营工作台" />
            <div class="page-body">
                <nav class="sidebar">
                    <button class="btn btn-small sidebar-toggle" on:click=toggle_sidebar>
                        {move || if store.sidebar_collapsed().get() { "»" } else { "«" }}
                    </button>
                    <ul class="nav-list">
                        {Section::ALL
                            .into_iter()
                            .map(|section| {
                                view! {
                                    <li class="nav-item" class:active=move || active.get() == section>
                                        <a href="#" class="nav-link" on:click=move |ev| {
                                            ev.prevent_default();
                                            active.set(section);
                                        }>{section.label()}</a>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </nav>
                <main class="main-content">
                    <RemindersSection visible=shown(Section::Reminders) />
                    <FeedbacksSection visible=shown(Section::Feedbacks) />
                    <StudentsSection visible=shown(Section::Students) />
                    <VisitsSection visible=shown(Section::Visits) />
                </main>
            </div>
            <StudentInfoModal open=viewer.open student=viewer.student />
        </div>
    }
}
