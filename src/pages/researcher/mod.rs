//! Researcher View
//!
//! Side navigation over four sections. A section reloads its list every
//! time it is switched to.

mod announcements;
mod batch;
mod evaluations;
mod tasks;

use leptos::prelude::*;

use super::{load_board_reminders, load_when_shown, RoleGate, UserBar};
use crate::components::ReminderBoard;
use crate::context::use_services;
use crate::list_state::ListState;
use crate::models::{Reminder, Role};

use announcements::AnnouncementsSection;
use evaluations::EvaluationsSection;
use tasks::TasksSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Announcements,
    Reminders,
    Evaluations,
    Tasks,
}

impl Section {
    const ALL: [Section; 4] = [Section::Announcements, Section::Reminders, Section::Evaluations, Section::Tasks];

    fn label(&self) -> &'static str {
        match self {
            Section::Announcements => "公告管理",
            Section::Reminders => "提醒",
            Section::Evaluations => "点评管理",
            Section::Tasks => "任务分配",
        }
    }
}

#[component]
pub fn ResearcherPage() -> impl IntoView {
    view! {
        <RoleGate role=Role::Researcher>
            <ResearcherDashboard />
        </RoleGate>
    }
}

#[component]
fn ResearcherDashboard() -> impl IntoView {
    let active = RwSignal::new(Section::Announcements);
    let shown = move |section: Section| Signal::derive(move || active.get() == section);

    view! {
        <div class="researcher-page">
            <UserBar title="教研工作台" />
            <div class="page-body">
                <nav class="sidebar">
                    <ul class="nav-list">
                        {Section::ALL
                            .into_iter()
                            .map(|section| {
                                view! {
                                    <li class="nav-item" class:active=move || active.get() == section>
                                        <a href="#" on:click=move |ev| {
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
                    <AnnouncementsSection visible=shown(Section::Announcements) />
                    <RemindersSection visible=shown(Section::Reminders) />
                    <EvaluationsSection visible=shown(Section::Evaluations) />
                    <TasksSection visible=shown(Section::Tasks) />
                </main>
            </div>
        </div>
    }
}

#[component]
fn RemindersSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let reminders = RwSignal::new(ListState::<Reminder>::new(10));
    load_when_shown(visible, false, move || load_board_reminders(services, reminders));

    let on_page = move |page: u32| {
        reminders.update(|s| s.set_page(page));
        load_board_reminders(services, reminders);
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"提醒"</h2>
            </div>
            <ReminderBoard state=reminders on_page=on_page />
        </section>
    }
}
