//! Evaluation (feedback) browser with teacher/course filters.

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, FeedbackQuery};
use crate::components::{ListStatus, Pager};
use crate::context::{use_services, Services};
use crate::labels;
use crate::list_state::{spawn_list_load, ListState};
use crate::models::{Course, Feedback, PersonRole};
use crate::pages::load_when_shown;
use crate::store::{store_error, use_ui_store};

const ORDERINGS: &[(&str, &str)] = &[("-created_at", "最新优先"), ("created_at", "最早优先")];

fn load_evaluations(services: Services, state: RwSignal<ListState<Feedback>>, query: FeedbackQuery) {
    let client = services.api();
    spawn_list_load(state, async move { api::list_feedbacks(&client, &query).await });
}

#[component]
pub(super) fn EvaluationsSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let list = RwSignal::new(ListState::<Feedback>::new(20));
    // Filter form; copied into `query` on apply
    let form = RwSignal::new(FeedbackQuery::default());
    let query = StoredValue::new(FeedbackQuery::default());
    let teachers = RwSignal::new(Vec::<PersonRole>::new());
    let courses = RwSignal::new(Vec::<Course>::new());
    let filters_loaded = StoredValue::new(false);

    let reload = move || load_evaluations(services, list, query.get_value());

    load_when_shown(visible, false, move || {
        if filters_loaded.get_value() {
            reload();
            return;
        }
        spawn_local(async move {
            let client = services.api();
            let teacher_result = api::list_teachers(&client).await;
            let course_result = api::list_courses(&client).await;
            match (teacher_result, course_result) {
                (Ok(t), Ok(c)) => {
                    teachers.set(t);
                    courses.set(c);
                    filters_loaded.set_value(true);
                }
                (t, c) => {
                    if let Ok(t) = t {
                        teachers.set(t);
                    }
                    if let Ok(c) = c {
                        courses.set(c);
                    }
                    log::error!("[RESEARCHER] evaluation filter options failed to load");
                    store_error(&store, "初始化筛选选项失败，请刷新页面重试");
                }
            }
            reload();
        });
    });

    let apply = move || {
        let mut next = form.get_untracked();
        next.page = 1;
        query.set_value(next);
        list.update(|s| s.set_page(1));
        reload();
    };
    let clear = move |_| {
        let cleared = form.with_untracked(FeedbackQuery::cleared);
        form.set(cleared.clone());
        query.set_value(cleared);
        list.update(|s| s.set_page(1));
        reload();
    };
    let on_page = move |page: u32| {
        query.update_value(|q| q.page = page);
        list.update(|s| s.set_page(page));
        reload();
    };
    let on_enter = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" {
            apply();
        }
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"点评管理"</h2>
            </div>
            <div class="filters">
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索点评内容"
                    prop:value=move || form.with(|f| f.q.clone())
                    on:input=move |ev| form.update(|f| f.q = event_target_value(&ev))
                    on:keydown=on_enter
                />
                <input
                    type="date"
                    class="form-control"
                    prop:value=move || form.with(|f| f.start.clone())
                    on:change=move |ev| form.update(|f| f.start = event_target_value(&ev))
                />
                <input
                    type="date"
                    class="form-control"
                    prop:value=move || form.with(|f| f.end.clone())
                    on:change=move |ev| form.update(|f| f.end = event_target_value(&ev))
                />
                <select
                    class="form-control"
                    prop:value=move || {
                        teachers.track();
                        form.with(|f| f.teacher_id.clone())
                    }
                    on:change=move |ev| form.update(|f| f.teacher_id = event_target_value(&ev))
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
                    prop:value=move || {
                        courses.track();
                        form.with(|f| f.course_id.clone())
                    }
                    on:change=move |ev| form.update(|f| f.course_id = event_target_value(&ev))
                >
                    <option value="">"全部课程"</option>
                    <For
                        each=move || courses.get()
                        key=|c| c.id.clone()
                        children=|c| view! { <option value=c.id.to_string()>{c.name}</option> }
                    />
                </select>
                <input
                    type="text"
                    class="form-control"
                    placeholder="学员ID"
                    prop:value=move || form.with(|f| f.student_id.clone())
                    on:input=move |ev| form.update(|f| f.student_id = event_target_value(&ev))
                    on:keydown=on_enter
                />
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
            <ListStatus
                loading=Signal::derive(move || list.with(|s| s.is_loading()))
                error=Signal::derive(move || list.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || list.with(|s| s.is_empty()))
                empty_title="暂无数据"
                empty_hint="调整筛选条件后再试试"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|f| f.id.clone()
                children=|item| {
                    let created = labels::format_seconds(item.created_at.as_deref());
                    let teacher_text = item.teacher_text().unwrap_or_default().to_string();
                    let researcher = item.researcher_feedback.clone().unwrap_or_default();
                    view! {
                        <div class="evaluation-item">
                            <div class="evaluation-row">
                                <div class="evaluation-col">
                                    <div><strong>"创建时间："</strong>{created}</div>
                                    <div><strong>"学员："</strong>{item.student_label()}</div>
                                    <div><strong>"教师："</strong>{item.teacher_label()}</div>
                                </div>
                                <div class="evaluation-col">
                                    <div>
                                        <strong>"教师点评："</strong>
                                        <span title=teacher_text.clone()>{or_dash(&teacher_text)}</span>
                                    </div>
                                    <div>
                                        <strong>"教研反馈："</strong>
                                        <span title=researcher.clone()>{or_dash(&researcher)}</span>
                                    </div>
                                </div>
                            </div>
                        </div>
                    }
                }
            />
            <Pager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
        </section>
    }
}

fn or_dash(text: &str) -> String {
    if text.is_empty() { "-".to_string() } else { text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_dash_keeps_text_for_title() {
        let teacher_text = "节奏稳定".to_string();
        let shown = or_dash(&teacher_text);
        assert_eq!(shown, teacher_text);
        assert_eq!(or_dash(""), "-");
    }
}
