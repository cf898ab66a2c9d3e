//! Teacher View
//!
//! Announcement/reminder board on top, the teacher's own evaluation tasks
//! below.

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{load_announcements, load_board_reminders, RoleGate, UserBar};
use crate::api::{self, MyTaskQuery, TaskSubmission};
use crate::components::{AnnouncementBoard, ListStatus, Modal, Pager, ReminderBoard};
use crate::context::{use_services, Services};
use crate::labels;
use crate::list_state::{spawn_list_load, ListState};
use crate::models::{Announcement, Course, EvalTask, Piece, Reminder, Role};
use crate::session::TEACHER_BOARD_COLLAPSED_KEY;
use crate::store::{store_error, store_success, store_toggle_flag, use_ui_store, UiStateStoreFields};

const TASK_STATUS_FILTERS: &[(&str, &str)] = &[("", "全部状态"), ("pending", "未完成"), ("completed", "已完成")];

#[component]
pub fn TeacherPage() -> impl IntoView {
    view! {
        <RoleGate role=Role::Teacher>
            <TeacherDashboard />
        </RoleGate>
    }
}

#[component]
fn TeacherDashboard() -> impl IntoView {
    view! {
        <div class="teacher-page">
            <UserBar title="教师工作台" />
            <TeacherBoard />
            <MyTasks />
        </div>
    }
}

// ========================
// Board
// ========================

#[component]
fn TeacherBoard() -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let announcements = RwSignal::new(ListState::<Announcement>::new(10));
    let reminders = RwSignal::new(ListState::<Reminder>::new(10));
    let marking = RwSignal::new(false);

    store.board_collapsed().set(services.session().get_flag(TEACHER_BOARD_COLLAPSED_KEY));

    let load_board = move || {
        load_announcements(services, announcements);
        load_board_reminders(services, reminders);
    };
    load_board();

    let on_ann_page = move |page: u32| {
        announcements.update(|s| s.set_page(page));
        load_announcements(services, announcements);
    };
    let on_rem_page = move |page: u32| {
        reminders.update(|s| s.set_page(page));
        load_board_reminders(services, reminders);
    };

    let toggle = move |_| {
        store_toggle_flag(store.board_collapsed(), &services.session(), TEACHER_BOARD_COLLAPSED_KEY);
    };

    let mark_read = move |_| {
        let ids: Vec<String> = reminders.with_untracked(|s| s.items.iter().map(|r| r.id.to_string()).collect());
        if ids.is_empty() || marking.get_untracked() {
            return;
        }
        marking.set(true);
        spawn_local(async move {
            match api::mark_reminders_read(&services.api(), &ids).await {
                Ok(()) => {
                    store_success(&store, "已标记为已读");
                    load_board_reminders(services, reminders);
                }
                Err(e) => {
                    log::error!("[TEACHER] mark read failed: {}", e);
                    store_error(&store, format!("标记失败：{}", e));
                }
            }
            marking.set(false);
        });
    };

    view! {
        <section class="teacher-board" class:collapsed=move || store.board_collapsed().get()>
            <div class="section-header">
                <h2>"公告与提醒"</h2>
                <div class="section-actions">
                    <button class="btn btn-secondary btn-small" on:click=move |_| load_board()>"刷新"</button>
                    <button class="btn btn-secondary btn-small" on:click=toggle>
                        {move || if store.board_collapsed().get() { "展开" } else { "收起" }}
                    </button>
                </div>
            </div>
            <div class="board-body" style:display=move || if store.board_collapsed().get() { "none" } else { "" }>
                <div class="board-column">
                    <h3>"公告"</h3>
                    <AnnouncementBoard state=announcements on_page=on_ann_page />
                </div>
                <div class="board-column">
                    <div class="column-header">
                        <h3>"提醒"</h3>
                        <button
                            class="btn btn-small"
                            disabled=move || marking.get() || reminders.with(|s| s.items.is_empty())
                            on:click=mark_read
                        >
                            "本页标为已读"
                        </button>
                    </div>
                    <ReminderBoard state=reminders on_page=on_rem_page />
                </div>
            </div>
        </section>
    }
}

// ========================
// My Tasks
// ========================

fn load_my_tasks(services: Services, state: RwSignal<ListState<EvalTask>>, status: String) {
    let Some(person_id) = services.person_id() else {
        log::warn!("[TEACHER] no person id on the session, skipping task list");
        return;
    };
    let query = MyTaskQuery {
        page: state.with_untracked(|s| s.page.page),
        status,
        ..MyTaskQuery::new(person_id)
    };
    let client = services.api();
    spawn_list_load(state, async move { api::list_my_tasks(&client, &query).await });
}

#[component]
fn MyTasks() -> impl IntoView {
    let services = use_services();
    let tasks = RwSignal::new(ListState::<EvalTask>::new(10));
    let status = RwSignal::new(String::new());
    let submit_open = RwSignal::new(false);
    let submitting = RwSignal::new(None::<EvalTask>);

    let reload = move || load_my_tasks(services, tasks, status.get_untracked());
    reload();

    let on_status = move |ev: web_sys::Event| {
        status.set(event_target_value(&ev));
        tasks.update(|s| s.set_page(1));
        reload();
    };
    let on_page = move |page: u32| {
        tasks.update(|s| s.set_page(page));
        reload();
    };
    let open_submit = move |task: EvalTask| {
        submitting.set(Some(task));
        submit_open.set(true);
    };

    view! {
        <section class="my-tasks">
            <div class="section-header">
                <h2>"我的任务"</h2>
                <select class="form-control filter" on:change=on_status prop:value=move || status.get()>
                    {TASK_STATUS_FILTERS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
            </div>
            <ListStatus
                loading=Signal::derive(move || tasks.with(|s| s.is_loading()))
                error=Signal::derive(move || tasks.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || tasks.with(|s| s.is_empty()))
                empty_title="暂无任务"
            />
            <For
                each=move || tasks.with(|s| s.items.clone())
                key=|t| t.id.clone()
                children=move |task| {
                    let (status_text, badge) = labels::task_status(task.status.as_deref());
                    let done = task.is_completed();
                    let created = labels::format_minutes(task.created_at.as_deref());
                    let note = task.note.clone().filter(|n| !n.is_empty());
                    let student = task.student_label();
                    let source = labels::task_source(task.source.as_deref());
                    view! {
                        <div class="list-row task-row">
                            <div class="list-title">
                                <span class=format!("badge {}", badge)>{status_text}</span>
                                {student}
                            </div>
                            <div class="list-meta">
                                <span>"创建时间：" {created}</span>
                                <span>"来源：" {source}</span>
                            </div>
                            {note.map(|n| view! { <div class="list-content">{n}</div> })}
                            <Show when=move || !done>
                                {
                                    let task = task.clone();
                                    view! {
                                        <button class="btn btn-primary btn-small" on:click=move |_| open_submit(task.clone())>
                                            "提交反馈"
                                        </button>
                                    }
                                }
                            </Show>
                        </div>
                    }
                }
            />
            <Pager state=Signal::derive(move || tasks.with(|s| s.page)) on_page=on_page />
            <SubmitTaskModal open=submit_open task=submitting on_done=move |_: ()| reload() />
        </section>
    }
}

#[component]
fn SubmitTaskModal(
    open: RwSignal<bool>,
    task: RwSignal<Option<EvalTask>>,
    #[prop(into)] on_done: Callback<()>,
) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let courses = RwSignal::new(Vec::<Course>::new());
    let course = RwSignal::new(String::new());
    let pieces = RwSignal::new(Vec::<Piece>::new());
    let picked = RwSignal::new(Vec::<String>::new());
    let content = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);
    let courses_loaded = StoredValue::new(false);

    // Reset the form for each task and load courses the first time
    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        task.track();
        content.set(String::new());
        picked.set(Vec::new());
        error.set(None);
        if !courses_loaded.get_value() {
            courses_loaded.set_value(true);
            spawn_local(async move {
                match api::list_courses(&services.api()).await {
                    Ok(list) => courses.set(list),
                    Err(e) => {
                        courses_loaded.set_value(false);
                        error.set(Some(format!("课程加载失败：{}", e)));
                    }
                }
            });
        }
    });

    let on_course = move |ev: web_sys::Event| {
        let id = event_target_value(&ev);
        course.set(id.clone());
        picked.set(Vec::new());
        pieces.set(Vec::new());
        if id.is_empty() {
            return;
        }
        spawn_local(async move {
            match api::list_course_pieces(&services.api(), &id).await {
                Ok(list) => {
                    if course.get_untracked() == id {
                        pieces.set(list);
                    }
                }
                Err(e) => error.set(Some(format!("曲目加载失败：{}", e))),
            }
        });
    };

    let toggle_piece = move |id: String, checked: bool| {
        picked.update(|p| {
            p.retain(|x| *x != id);
            if checked {
                p.push(id);
            }
        });
    };

    let submit = move |_| {
        let Some(current) = task.get_untracked() else {
            return;
        };
        let text = content.get_untracked().trim().to_string();
        if text.is_empty() {
            error.set(Some("请填写反馈内容".to_string()));
            return;
        }
        let submission = TaskSubmission {
            content: text,
            pieces: picked.get_untracked(),
        };
        saving.set(true);
        spawn_local(async move {
            match api::submit_task(&services.api(), current.id.as_str(), &submission).await {
                Ok(()) => {
                    open.set(false);
                    store_success(&store, "提交成功");
                    on_done.run(());
                }
                Err(e) => {
                    log::error!("[TEACHER] submit task {} failed: {}", current.id, e);
                    error.set(Some(e.to_string()));
                }
            }
            saving.set(false);
        });
    };

    let title = Signal::derive(move || {
        task.with(|t| t.as_ref().map(|t| format!("提交反馈 - {}", t.student_label())))
            .unwrap_or_else(|| "提交反馈".to_string())
    });

    view! {
        <Modal open=open title=title>
            <div class="form-group">
                <label>"课程"</label>
                <select class="form-control" prop:value=move || course.get() on:change=on_course>
                    <option value="">"请选择课程"</option>
                    <For
                        each=move || courses.get()
                        key=|c| c.id.clone()
                        children=|c| view! { <option value=c.id.to_string()>{c.name}</option> }
                    />
                </select>
            </div>
            <div class="form-group piece-list">
                <For
                    each=move || pieces.get()
                    key=|p| p.id.clone()
                    children=move |piece| {
                        let id = piece.id.to_string();
                        let checked_id = id.clone();
                        view! {
                            <label class="piece-option">
                                <input
                                    type="checkbox"
                                    prop:checked=move || picked.with(|p| p.contains(&checked_id))
                                    on:change=move |ev| toggle_piece(id.clone(), event_target_checked(&ev))
                                />
                                {piece.name}
                            </label>
                        }
                    }
                />
            </div>
            <div class="form-group">
                <label>"反馈内容"</label>
                <textarea
                    class="form-control"
                    rows="5"
                    prop:value=move || content.get()
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
            </div>
            {move || error.get().map(|e| view! { <div class="form-error">{e}</div> })}
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"取消"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=submit>
                    {move || if saving.get() { "提交中..." } else { "提交" }}
                </button>
            </div>
        </Modal>
    }
}
