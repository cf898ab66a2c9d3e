use leptos::prelude::*;
use leptos::task::spawn_local;

use super::StudentLink;
use crate::api::{self, VisitPayload, VisitQuery};
use crate::components::{ListStatus, Modal, Pager, StudentPicker, StudentSource};
use crate::context::{use_services, Services};
use crate::labels::{self, VISIT_STATUS_OPTIONS, VISIT_URGENCY_OPTIONS};
use crate::list_state::{spawn_list_load, ListState};
use crate::models::VisitRecord;
use crate::pages::load_when_shown;
use crate::store::{store_error, use_ui_store};
use crate::validation::non_blank;

const ORDERINGS: &[(&str, &str)] = &[
    ("-created_at", "最新优先"),
    ("created_at", "最早优先"),
    ("next_follow_up_at", "下次回访最近"),
];

fn load_visits(services: Services, state: RwSignal<ListState<VisitRecord>>, query: VisitQuery) {
    let client = services.api();
    spawn_list_load(state, async move { api::list_visits(&client, &query).await });
}

/// Editable visit fields as the form holds them
#[derive(Debug, Clone, PartialEq)]
struct VisitForm {
    id: Option<String>,
    student: String,
    urgency: String,
    status: String,
    need_follow_up: bool,
    next_follow_up_at: String,
    content: String,
    result: String,
}

impl Default for VisitForm {
    fn default() -> Self {
        Self {
            id: None,
            student: String::new(),
            urgency: String::new(),
            status: VISIT_STATUS_OPTIONS[0].0.to_string(),
            need_follow_up: false,
            next_follow_up_at: String::new(),
            content: String::new(),
            result: String::new(),
        }
    }
}

impl VisitForm {
    fn from_record(record: &VisitRecord) -> Self {
        Self {
            id: Some(record.id.to_string()),
            student: record
                .student
                .as_ref()
                .and_then(|s| s.id())
                .map(|id| id.to_string())
                .unwrap_or_default(),
            urgency: record.urgency.clone().unwrap_or_default(),
            status: record
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| VISIT_STATUS_OPTIONS[0].0.to_string()),
            need_follow_up: record.need_follow_up,
            next_follow_up_at: labels::to_datetime_local(record.next_follow_up_at.as_deref()),
            content: record.content.clone().unwrap_or_default(),
            result: record.result.clone().unwrap_or_default(),
        }
    }

    /// Payload for create or full replace; fails with the message to show
    fn payload(&self, operator: Option<String>) -> Result<VisitPayload, &'static str> {
        if self.student.trim().is_empty() {
            return Err("请选择学员");
        }
        if operator.is_none() {
            return Err("未获取到当前人员信息，请重新登录后重试");
        }
        Ok(VisitPayload {
            student: self.student.trim().to_string(),
            urgency: non_blank(&self.urgency),
            status: self.status.clone(),
            need_follow_up: self.need_follow_up,
            content: self.content.trim().to_string(),
            result: self.result.trim().to_string(),
            next_follow_up_at: labels::from_datetime_local(&self.next_follow_up_at),
            operator,
        })
    }
}

#[component]
pub(super) fn VisitsSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let list = RwSignal::new(ListState::<VisitRecord>::new(20));
    let filters = RwSignal::new(VisitQuery::default());
    let query = StoredValue::new(VisitQuery::default());
    let modal_open = RwSignal::new(false);
    let form = RwSignal::new(VisitForm::default());
    let form_seq = RwSignal::new(0u32);

    let reload = move || load_visits(services, list, query.get_value());
    load_when_shown(visible, true, reload);

    let run_query = move |next: VisitQuery| {
        list.update(|s| s.set_page(next.page));
        query.set_value(next);
        reload();
    };
    let apply = move |_| {
        let mut next = filters.get_untracked();
        next.q = next.q.trim().to_string();
        next.page = 1;
        run_query(next);
    };
    let clear = move |_| {
        filters.set(VisitQuery::default());
        run_query(VisitQuery::default());
    };
    let on_page = move |page: u32| {
        let mut next = query.get_value();
        next.page = page;
        run_query(next);
    };

    let open_form = move |initial: VisitForm| {
        form.set(initial);
        form_seq.update(|n| *n += 1);
        modal_open.set(true);
    };
    let edit_visit = move |id: String| {
        spawn_local(async move {
            match api::get_visit(&services.api(), &id).await {
                Ok(record) => open_form(VisitForm::from_record(&record)),
                Err(e) => store_error(&store, format!("加载回访失败：{}", e)),
            }
        });
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"回访记录"</h2>
                <div class="section-actions">
                    <button class="btn btn-secondary" on:click=move |_| reload()>"刷新"</button>
                    <button class="btn btn-primary" on:click=move |_| open_form(VisitForm::default())>"新建回访"</button>
                </div>
            </div>
            <div class="filters">
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索学员/内容"
                    prop:value=move || filters.with(|f| f.q.clone())
                    on:input=move |ev| filters.update(|f| f.q = event_target_value(&ev))
                />
                <select
                    class="form-control"
                    prop:value=move || filters.with(|f| f.status.clone())
                    on:change=move |ev| filters.update(|f| f.status = event_target_value(&ev))
                >
                    <option value="">"全部状态"</option>
                    {VISIT_STATUS_OPTIONS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <select
                    class="form-control"
                    prop:value=move || filters.with(|f| f.urgency.clone())
                    on:change=move |ev| filters.update(|f| f.urgency = event_target_value(&ev))
                >
                    <option value="">"全部紧急度"</option>
                    {VISIT_URGENCY_OPTIONS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <select
                    class="form-control"
                    prop:value=move || filters.with(|f| f.ordering.clone())
                    on:change=move |ev| filters.update(|f| f.ordering = event_target_value(&ev))
                >
                    {ORDERINGS
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
                <button class="btn btn-primary" on:click=apply>"筛选"</button>
                <button class="btn btn-secondary" on:click=clear>"清空"</button>
            </div>
            <ListStatus
                loading=Signal::derive(move || list.with(|s| s.is_loading()))
                error=Signal::derive(move || list.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || list.with(|s| s.is_empty()))
                empty_title="暂无回访记录"
                empty_hint="尝试修改筛选条件"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|v| v.id.clone()
                children=move |v| {
                    let (urgency, badge) = labels::ops_urgency(v.urgency.as_deref());
                    let status = labels::visit_status(v.status.as_deref());
                    let content = v.content.clone().filter(|c| !c.is_empty()).unwrap_or_else(|| "-".to_string());
                    let mut next_at = labels::format_minutes(v.next_follow_up_at.as_deref());
                    if next_at.is_empty() {
                        next_at = "-".to_string();
                    }
                    let id = v.id.to_string();
                    view! {
                        <div class="card">
                            <div class="card-header">
                                <span class=format!("badge {}", badge)>{urgency}</span>
                                <span>"状态：" {status}</span>
                                <span class="muted push-right">"创建：" {labels::format_seconds(v.created_at.as_deref())}</span>
                            </div>
                            <div class="card-body">
                                <div>
                                    <strong>"学员："</strong>
                                    <StudentLink student=v.student.clone() name=v.student_label().unwrap_or_default() />
                                </div>
                                <div class="card-text">{content}</div>
                                <div class="muted">"下次回访：" {next_at}</div>
                                <div class="card-actions">
                                    <button class="btn btn-primary btn-small" on:click=move |_| edit_visit(id.clone())>
                                        "编辑"
                                    </button>
                                </div>
                            </div>
                        </div>
                    }
                }
            />
            <Pager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
            <VisitModal open=modal_open form=form open_seq=form_seq on_saved=move |_: ()| reload() />
        </section>
    }
}

#[component]
fn VisitModal(
    open: RwSignal<bool>,
    form: RwSignal<VisitForm>,
    open_seq: RwSignal<u32>,
    #[prop(into)] on_saved: Callback<()>,
) -> impl IntoView {
    let services = use_services();
    let student = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);

    // The picker owns its own signal; mirror it in and out of the form
    Effect::new(move |_| {
        open_seq.track();
        error.set(None);
        student.set(form.with_untracked(|f| f.student.clone()));
    });
    Effect::new(move |_| {
        let picked = student.get();
        form.update_untracked(|f| f.student = picked);
    });

    let save = move |_| {
        error.set(None);
        let current = form.get_untracked();
        let payload = match current.payload(services.person_id()) {
            Ok(p) => p,
            Err(msg) => {
                error.set(Some(msg.to_string()));
                return;
            }
        };
        saving.set(true);
        spawn_local(async move {
            let client = services.api();
            let result = match &current.id {
                Some(id) => api::update_visit(&client, id, &payload).await,
                None => api::create_visit(&client, &payload).await,
            };
            saving.set(false);
            match result {
                Ok(()) => {
                    open.set(false);
                    on_saved.run(());
                }
                Err(e) => {
                    log::error!("[OPS] save visit failed: {}", e);
                    let msg = e.to_string();
                    error.set(Some(if msg.is_empty() { "保存失败".to_string() } else { msg }));
                }
            }
        });
    };

    let is_new = move || form.with(|f| f.id.is_none());
    let title = Signal::derive(move || if is_new() { "新建回访" } else { "编辑回访" }.to_string());

    view! {
        <Modal open=open title=title>
            <div class="form-group">
                <label>"学员"</label>
                <StudentPicker selected=student source=StudentSource::Ops />
            </div>
            <div class="form-row">
                <div class="form-group">
                    <label>"紧急度"</label>
                    <select
                        class="form-control"
                        prop:value=move || form.with(|f| f.urgency.clone())
                        on:change=move |ev| form.update(|f| f.urgency = event_target_value(&ev))
                    >
                        <option value="">"未设置"</option>
                        {VISIT_URGENCY_OPTIONS
                            .iter()
                            .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                            .collect_view()}
                    </select>
                </div>
                <div class="form-group">
                    <label>"状态"</label>
                    <select
                        class="form-control"
                        prop:value=move || form.with(|f| f.status.clone())
                        on:change=move |ev| form.update(|f| f.status = event_target_value(&ev))
                    >
                        {VISIT_STATUS_OPTIONS
                            .iter()
                            .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                            .collect_view()}
                    </select>
                </div>
            </div>
            <div class="form-row">
                <label class="checkbox">
                    <input
                        type="checkbox"
                        prop:checked=move || form.with(|f| f.need_follow_up)
                        on:change=move |ev| form.update(|f| f.need_follow_up = event_target_checked(&ev))
                    />
                    "需要跟进"
                </label>
                <div class="form-group">
                    <label>"下次回访时间"</label>
                    <input
                        type="datetime-local"
                        class="form-control"
                        prop:value=move || form.with(|f| f.next_follow_up_at.clone())
                        on:input=move |ev| form.update(|f| f.next_follow_up_at = event_target_value(&ev))
                    />
                </div>
            </div>
            <div class="form-group">
                <label>"回访内容"</label>
                <textarea
                    class="form-control"
                    rows="4"
                    prop:value=move || form.with(|f| f.content.clone())
                    on:input=move |ev| form.update(|f| f.content = event_target_value(&ev))
                ></textarea>
            </div>
            <div class="form-group">
                <label>"回访结果"</label>
                <textarea
                    class="form-control"
                    rows="3"
                    prop:value=move || form.with(|f| f.result.clone())
                    on:input=move |ev| form.update(|f| f.result = event_target_value(&ev))
                ></textarea>
            </div>
            {move || error.get().map(|e| view! { <div class="form-error">{e}</div> })}
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"关闭"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
            </div>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;

    fn record() -> VisitRecord {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "student": {"id": 10, "nickname": "小明"},
            "status": "",
            "urgency": "high",
            "need_follow_up": true,
            "content": "电话沟通",
        }))
        .unwrap()
    }

    #[test]
    fn test_form_from_record_defaults_blank_status_to_pending() {
        let form = VisitForm::from_record(&record());
        assert_eq!(form.id.as_deref(), Some("5"));
        assert_eq!(form.student, "10");
        assert_eq!(form.status, "pending");
        assert!(form.need_follow_up);
    }

    #[test]
    fn test_payload_requires_student_then_operator() {
        let form = VisitForm::default();
        assert_eq!(form.payload(Some("1".to_string())), Err("请选择学员"));

        let form = VisitForm {
            student: "10".to_string(),
            ..VisitForm::default()
        };
        assert_eq!(form.payload(None), Err("未获取到当前人员信息，请重新登录后重试"));
    }

    #[test]
    fn test_payload_drops_blank_optionals() {
        let form = VisitForm {
            student: " 10 ".to_string(),
            content: " 已联系 ".to_string(),
            ..VisitForm::default()
        };
        let payload = form.payload(Some(EntityId::new("7").to_string())).unwrap();
        assert_eq!(payload.student, "10");
        assert_eq!(payload.urgency, None);
        assert_eq!(payload.next_follow_up_at, None);
        assert_eq!(payload.content, "已联系");
        assert_eq!(payload.operator.as_deref(), Some("7"));
    }
}
