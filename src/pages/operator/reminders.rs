use leptos::prelude::*;
use leptos::task::spawn_local;

use super::StudentLink;
use crate::api::{self, NewReminder, ReminderQuery};
use crate::components::{ListStatus, Modal, Pager, StudentPicker, StudentSource};
use crate::context::{use_services, Services};
use crate::labels::{self, OPS_CATEGORY_OPTIONS, OPS_URGENCY_OPTIONS};
use crate::list_state::{spawn_list_load, ListState};
use crate::models::{Person, Reminder};
use crate::pages::load_when_shown;
use crate::validation::non_blank;

const ORDERINGS: &[(&str, &str)] = &[("-created_at", "最新优先"), ("created_at", "最早优先")];

fn load_reminders(services: Services, state: RwSignal<ListState<Reminder>>, query: ReminderQuery) {
    let client = services.api();
    spawn_list_load(state, async move { api::list_reminders(&client, &query).await });
}

#[component]
pub(super) fn RemindersSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let list = RwSignal::new(ListState::<Reminder>::new(10));
    let form = RwSignal::new(ReminderQuery::ops(services.person_id()));
    let query = StoredValue::new(ReminderQuery::ops(services.person_id()));
    let modal_open = RwSignal::new(false);

    let reload = move || load_reminders(services, list, query.get_value());
    load_when_shown(visible, true, reload);

    let run_query = move |next: ReminderQuery| {
        list.update(|s| s.set_page(next.page));
        query.set_value(next);
        reload();
    };
    let apply = move |_| {
        let mut next = form.get_untracked();
        next.q = next.q.trim().to_string();
        next.page = 1;
        run_query(next);
    };
    let clear = move |_| {
        let fresh = ReminderQuery::ops(services.person_id());
        form.set(fresh.clone());
        run_query(fresh);
    };
    let on_page = move |page: u32| {
        let mut next = query.get_value();
        next.page = page;
        run_query(next);
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"提醒"</h2>
                <div class="section-actions">
                    <button class="btn btn-secondary" on:click=move |_| reload()>"刷新"</button>
                    <button class="btn btn-primary" on:click=move |_| modal_open.set(true)>"新建提醒"</button>
                </div>
            </div>
            <div class="filters">
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索内容"
                    prop:value=move || form.with(|f| f.q.clone())
                    on:input=move |ev| form.update(|f| f.q = event_target_value(&ev))
                />
                <select
                    class="form-control"
                    prop:value=move || form.with(|f| f.category.clone())
                    on:change=move |ev| form.update(|f| f.category = event_target_value(&ev))
                >
                    <option value="">"全部类别"</option>
                    {OPS_CATEGORY_OPTIONS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <select
                    class="form-control"
                    prop:value=move || form.with(|f| f.urgency.clone())
                    on:change=move |ev| form.update(|f| f.urgency = event_target_value(&ev))
                >
                    <option value="">"全部紧急度"</option>
                    {OPS_URGENCY_OPTIONS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <select
                    class="form-control"
                    prop:value=move || form.with(|f| f.ordering.clone())
                    on:change=move |ev| form.update(|f| f.ordering = event_target_value(&ev))
                >
                    {ORDERINGS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <label class="checkbox">
                    <input
                        type="checkbox"
                        prop:checked=move || form.with(|f| f.include_only_active)
                        on:change=move |ev| form.update(|f| f.include_only_active = event_target_checked(&ev))
                    />
                    "仅看生效中"
                </label>
                <button class="btn btn-primary" on:click=apply>"筛选"</button>
                <button class="btn btn-secondary" on:click=clear>"清空"</button>
            </div>
            <ListStatus
                loading=Signal::derive(move || list.with(|s| s.is_loading()))
                error=Signal::derive(move || list.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || list.with(|s| s.is_empty()))
                empty_title="暂无提醒"
                empty_hint="调整筛选条件或稍后刷新"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|r| r.id.clone()
                children=|r| view! { <ReminderCard reminder=r /> }
            />
            <Pager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
            <NewReminderModal open=modal_open on_created=move |_: ()| reload() />
        </section>
    }
}

#[component]
fn ReminderCard(reminder: Reminder) -> impl IntoView {
    let (urgency, badge) = labels::ops_urgency(reminder.urgency.as_deref());
    let pieces: Vec<String> = reminder
        .details()
        .iter()
        .enumerate()
        .map(|(i, d)| d.display_name(i))
        .collect();
    let body = reminder.body().unwrap_or("-").to_string();

    view! {
        <div class="card reminder-card">
            <div class="card-header">
                <span class=format!("badge {}", badge)>{urgency}</span>
                <span class="muted">{labels::ops_category(reminder.category.as_deref())}</span>
                <span class="muted push-right">{labels::format_seconds(reminder.created_at.as_deref())}</span>
            </div>
            <div class="card-body">
                <div>
                    <strong>"学员："</strong>
                    <StudentLink student=reminder.student.clone() name=reminder.student_label().unwrap_or_default() />
                </div>
                <div class="card-text">{body}</div>
                {(!pieces.is_empty())
                    .then(|| {
                        view! {
                            <div class="piece-details">
                                {pieces
                                    .into_iter()
                                    .map(|name| view! { <div class="muted">"曲目刻度：" {name}</div> })
                                    .collect_view()}
                            </div>
                        }
                    })}
            </div>
        </div>
    }
}

#[component]
fn NewReminderModal(open: RwSignal<bool>, #[prop(into)] on_created: Callback<()>) -> impl IntoView {
    let services = use_services();
    let student = RwSignal::new(String::new());
    let category = RwSignal::new(OPS_CATEGORY_OPTIONS[0].0.to_string());
    let urgency = RwSignal::new(OPS_URGENCY_OPTIONS[0].0.to_string());
    let content = RwSignal::new(String::new());
    let persons = RwSignal::new(None::<Result<Vec<Person>, String>>);
    let recipient_filter = RwSignal::new(String::new());
    let recipients = RwSignal::new(Vec::<String>::new());
    let error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);
    let persons_requested = StoredValue::new(false);

    Effect::new(move |_| {
        if !open.get() || persons_requested.get_value() {
            return;
        }
        persons_requested.set_value(true);
        spawn_local(async move {
            let loaded = api::list_persons(&services.api()).await.map_err(|e| {
                log::error!("[OPS] person list failed: {}", e);
                e.to_string()
            });
            persons.set(Some(loaded));
        });
    });

    let toggle_recipient = move |id: String, checked: bool| {
        recipients.update(|r| {
            r.retain(|x| *x != id);
            if checked {
                r.push(id);
            }
        });
    };

    let submit = move |_| {
        error.set(None);
        let reminder = NewReminder {
            category: category.get_untracked(),
            urgency: urgency.get_untracked(),
            content: content.get_untracked().trim().to_string(),
            student: non_blank(&student.get_untracked()),
            recipients: recipients.get_untracked(),
        };
        saving.set(true);
        spawn_local(async move {
            let result = api::create_reminder(&services.api(), &reminder).await;
            saving.set(false);
            match result {
                Ok(()) => {
                    open.set(false);
                    content.set(String::new());
                    student.set(String::new());
                    recipients.set(Vec::new());
                    on_created.run(());
                }
                Err(e) => {
                    log::error!("[OPS] create reminder failed: {}", e);
                    let msg = e.to_string();
                    error.set(Some(if msg.is_empty() { "创建失败".to_string() } else { msg }));
                }
            }
        });
    };

    view! {
        <Modal open=open title="创建提醒">
            <div class="form-group">
                <label>"学员（可选）"</label>
                <StudentPicker selected=student source=StudentSource::Ops placeholder="不关联学员" />
            </div>
            <div class="form-group">
                <label>"类别"</label>
                <select class="form-control" prop:value=move || category.get() on:change=move |ev| category.set(event_target_value(&ev))>
                    {OPS_CATEGORY_OPTIONS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
            </div>
            <div class="form-group">
                <label>"紧急度"</label>
                <select class="form-control" prop:value=move || urgency.get() on:change=move |ev| urgency.set(event_target_value(&ev))>
                    {OPS_URGENCY_OPTIONS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
            </div>
            <div class="form-group">
                <label>"内容"</label>
                <textarea
                    class="form-control"
                    rows="4"
                    placeholder="请输入提醒内容"
                    prop:value=move || content.get()
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
            </div>
            <div class="form-group">
                <label>"接收人（可多选；留空=自发自收）"</label>
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索登录用户名"
                    prop:value=move || recipient_filter.get()
                    on:input=move |ev| recipient_filter.set(event_target_value(&ev))
                />
                <div class="recipient-list">
                    {move || match persons.get() {
                        None => view! { <div class="muted">"正在加载人员..."</div> }.into_any(),
                        Some(Err(_)) => view! { <div class="muted">"加载人员失败，请重试"</div> }.into_any(),
                        Some(Ok(list)) => {
                            let filter = recipient_filter.get();
                            list.into_iter()
                                .filter(|p| p.matches_username(&filter))
                                .map(|p| {
                                    let id = p.id.to_string();
                                    let checked_id = id.clone();
                                    view! {
                                        <label class="recipient-option">
                                            <input
                                                type="checkbox"
                                                prop:checked=move || recipients.with(|r| r.contains(&checked_id))
                                                on:change=move |ev| toggle_recipient(id.clone(), event_target_checked(&ev))
                                            />
                                            {p.option_label()}
                                        </label>
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </div>
            {move || error.get().map(|e| view! { <div class="form-error">{e}</div> })}
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"关闭"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=submit>"提交"</button>
            </div>
        </Modal>
    }
}
