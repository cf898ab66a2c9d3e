//! Evaluation task assignment.

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::batch::BatchModal;
use crate::api::{self, EvalTaskQuery, NewEvalTask};
use crate::components::{ListStatus, Modal, NumberedPager, StudentPicker, StudentSource};
use crate::context::{use_services, Services};
use crate::labels;
use crate::list_state::{spawn_list_load, ListState};
use crate::models::{EvalTask, PersonRole};
use crate::pages::load_when_shown;
use crate::store::{store_error, store_success, use_ui_store};

const STATUS_FILTERS: &[(&str, &str)] = &[("", "全部状态"), ("pending", "未完成"), ("completed", "已完成")];
const ORDERINGS: &[(&str, &str)] = &[("-created_at", "最新创建"), ("created_at", "最早创建"), ("-updated_at", "最近更新")];

fn load_tasks(services: Services, state: RwSignal<ListState<EvalTask>>, query: EvalTaskQuery) {
    let client = services.api();
    spawn_list_load(state, async move { api::list_eval_tasks(&client, &query).await });
}

#[component]
pub(super) fn TasksSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let list = RwSignal::new(ListState::<EvalTask>::new(10));
    let form = RwSignal::new(EvalTaskQuery::default());
    let query = RwSignal::new(EvalTaskQuery::default());
    let teachers = RwSignal::new(Vec::<PersonRole>::new());
    let teachers_loaded = StoredValue::new(false);
    let task_open = RwSignal::new(false);
    let batch_open = RwSignal::new(false);
    let batch_seq = RwSignal::new(0u32);

    let reload = move || load_tasks(services, list, query.get_untracked());

    load_when_shown(visible, false, move || {
        if teachers_loaded.get_value() {
            reload();
            return;
        }
        spawn_local(async move {
            match api::list_teachers(&services.api()).await {
                Ok(found) => {
                    teachers.set(found);
                    teachers_loaded.set_value(true);
                }
                Err(e) => {
                    log::error!("[RESEARCHER] teacher options failed: {}", e);
                    store_error(&store, "初始化筛选选项失败，请刷新页面重试");
                }
            }
            reload();
        });
    });

    let run_query = move |next: EvalTaskQuery| {
        list.update(|s| s.set_page(next.page));
        query.set(next);
        reload();
    };
    let apply = move || {
        let mut next = form.get_untracked();
        next.search = next.search.trim().to_string();
        next.batch_id = query.with_untracked(|q| q.batch_id.clone());
        next.page = 1;
        run_query(next);
    };
    let clear = move |_| {
        form.set(EvalTaskQuery::default());
        run_query(EvalTaskQuery::default());
    };
    let clear_batch = move |_| {
        let mut next = query.get_untracked();
        next.batch_id.clear();
        next.page = 1;
        run_query(next);
    };
    let on_page = move |page: u32| {
        let mut next = query.get_untracked();
        next.page = page;
        run_query(next);
    };
    let on_task_created = move |_: ()| {
        let mut next = query.get_untracked();
        next.page = 1;
        run_query(next);
    };
    let on_batch_created = move |batch_id: String| {
        let mut next = query.get_untracked();
        next.batch_id = batch_id;
        next.page = 1;
        run_query(next);
    };
    let open_batch = move |_| {
        batch_seq.update(|n| *n += 1);
        batch_open.set(true);
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"任务分配"</h2>
                <div class="section-actions">
                    <button class="btn btn-secondary" on:click=move |_| reload()>"刷新"</button>
                    <button class="btn btn-primary" on:click=move |_| task_open.set(true)>"新建任务"</button>
                    <button class="btn btn-primary" on:click=open_batch>"创建任务批次"</button>
                </div>
            </div>
            <div class="filters">
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索学员/备注"
                    prop:value=move || form.with(|f| f.search.clone())
                    on:input=move |ev| form.update(|f| f.search = event_target_value(&ev))
                    on:keydown=move |ev: KeyboardEvent| {
                        if ev.key() == "Enter" {
                            apply();
                        }
                    }
                />
                <select
                    class="form-control"
                    prop:value=move || form.with(|f| f.status.clone())
                    on:change=move |ev| form.update(|f| f.status = event_target_value(&ev))
                >
                    {STATUS_FILTERS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <select
                    class="form-control"
                    prop:value=move || {
                        teachers.track();
                        form.with(|f| f.assignee.clone())
                    }
                    on:change=move |ev| form.update(|f| f.assignee = event_target_value(&ev))
                >
                    <option value="">"全部教师"</option>
                    <For
                        each=move || teachers.get()
                        key=|t| t.person.clone()
                        children=|t| view! { <option value=t.person.to_string()>{t.label()}</option> }
                    />
                </select>
                <select
                    class="form-control"
                    prop:value=move || form.with(|f| f.ordering.clone())
                    on:change=move |ev| {
                        form.update(|f| f.ordering = event_target_value(&ev));
                        apply();
                    }
                >
                    {ORDERINGS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <button class="btn btn-primary" on:click=move |_| apply()>"筛选"</button>
                <button class="btn btn-secondary" on:click=clear>"清空"</button>
            </div>
            {move || {
                let batch = query.with(|q| q.batch_id.clone());
                (!batch.is_empty())
                    .then(|| {
                        view! {
                            <div class="active-filter">
                                <span class="tag">"批次: " {batch}</span>
                                <button class="btn btn-small" on:click=clear_batch>"查看全部"</button>
                            </div>
                        }
                    })
            }}
            <ListStatus
                loading=Signal::derive(move || list.with(|s| s.is_loading()))
                error=Signal::derive(move || list.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || list.with(|s| s.is_empty()))
                empty_title="暂无任务"
                empty_hint="点击右上角“新建任务”或“创建任务批次”进行分配"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|t| (t.id.clone(), t.status.clone(), t.updated_at.clone())
                children=|task| view! { <TaskRow task=task /> }
            />
            <NumberedPager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
            <NewTaskModal open=task_open teachers=teachers on_created=on_task_created />
            <BatchModal open=batch_open open_seq=batch_seq teachers=teachers on_created=on_batch_created />
        </section>
    }
}

#[component]
fn TaskRow(task: EvalTask) -> impl IntoView {
    let (status, badge) = labels::task_status(task.status.as_deref());
    let batch = task.batch_id.clone().filter(|b| !b.is_empty());
    let note = task.note.clone().filter(|n| !n.is_empty());

    view! {
        <div class="evaluation-item">
            <div class="evaluation-meta">
                <div>
                    <strong>"学员："</strong>{task.student_label()}
                    <strong>"负责人："</strong>{task.assignee_label()}
                    <strong>"状态："</strong><span class=format!("badge {}", badge)>{status}</span>
                    {batch.map(|b| view! { <span class="tag">"批次: " {b}</span> })}
                </div>
                <div class="secondary">
                    <span>"来源：" {labels::task_source(task.source.as_deref())}</span>
                    <span>"创建：" {labels::format_minutes(task.created_at.as_deref())}</span>
                    <span>"更新：" {labels::format_minutes(task.updated_at.as_deref())}</span>
                </div>
            </div>
            <div class="evaluation-content">
                {match note {
                    Some(n) => view! { <span>{n}</span> }.into_any(),
                    None => view! { <em>"无备注"</em> }.into_any(),
                }}
            </div>
        </div>
    }
}

#[component]
fn NewTaskModal(
    open: RwSignal<bool>,
    teachers: RwSignal<Vec<PersonRole>>,
    #[prop(into)] on_created: Callback<()>,
) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let student = RwSignal::new(String::new());
    let assignee = RwSignal::new(String::new());
    let note = RwSignal::new(String::new());
    let saving = RwSignal::new(false);

    let save = move |_| {
        let student_id = student.get_untracked();
        if student_id.is_empty() {
            store_error(&store, "请选择学员");
            return;
        }
        let assignee_id = assignee.get_untracked();
        if assignee_id.is_empty() {
            store_error(&store, "请选择负责人教师");
            return;
        }
        let task = NewEvalTask::from_researcher(student_id, assignee_id, note.get_untracked().trim());
        saving.set(true);
        spawn_local(async move {
            let result = api::create_eval_task(&services.api(), &task).await;
            saving.set(false);
            match result {
                Ok(()) => {
                    open.set(false);
                    student.set(String::new());
                    note.set(String::new());
                    store_success(&store, "任务创建成功");
                    on_created.run(());
                }
                Err(e) => {
                    log::error!("[RESEARCHER] create task failed: {}", e);
                    store_error(&store, e.to_string());
                }
            }
        });
    };

    view! {
        <Modal open=open title="新建任务">
            <div class="form-group">
                <label>"学员"</label>
                <StudentPicker selected=student source=StudentSource::Legacy />
            </div>
            <div class="form-group">
                <label>"负责人教师"</label>
                <select
                    class="form-control"
                    prop:value=move || {
                        teachers.track();
                        assignee.get()
                    }
                    on:change=move |ev| assignee.set(event_target_value(&ev))
                >
                    <option value="">"请选择教师"</option>
                    <For
                        each=move || teachers.get()
                        key=|t| t.person.clone()
                        children=|t| view! { <option value=t.person.to_string()>{t.label()}</option> }
                    />
                </select>
            </div>
            <div class="form-group">
                <label>"备注"</label>
                <textarea
                    class="form-control"
                    rows="3"
                    prop:value=move || note.get()
                    on:input=move |ev| note.set(event_target_value(&ev))
                ></textarea>
            </div>
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"取消"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"创建"</button>
            </div>
        </Modal>
    }
}
