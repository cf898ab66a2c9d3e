use leptos::prelude::*;
use leptos::task::spawn_local;

use super::StudentLink;
use crate::api::{self, FeedbackQuery};
use crate::components::{ListStatus, Pager};
use crate::context::{use_services, Services};
use crate::labels;
use crate::list_state::{spawn_list_load, ListState};
use crate::models::Feedback;
use crate::pages::load_when_shown;
use crate::store::{store_error, store_success, use_ui_store};

const ORDERINGS: &[(&str, &str)] = &[("-created_at", "最新优先"), ("created_at", "最早优先")];

fn load_feedbacks(services: Services, state: RwSignal<ListState<Feedback>>, query: FeedbackQuery) {
    let client = services.api();
    spawn_list_load(state, async move { api::list_feedbacks(&client, &query).await });
}

/// `a / b / c` piece names, empty when the feedback has none
pub(super) fn piece_summary(feedback: &Feedback) -> String {
    feedback
        .pieces()
        .iter()
        .enumerate()
        .map(|(i, d)| d.display_name(i))
        .collect::<Vec<_>>()
        .join(" / ")
}

#[component]
pub(super) fn FeedbacksSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let list = RwSignal::new(ListState::<Feedback>::new(20));
    let q = RwSignal::new(String::new());
    let ordering = RwSignal::new(ORDERINGS[0].0.to_string());
    let query = StoredValue::new(FeedbackQuery::default());

    let reload = move || load_feedbacks(services, list, query.get_value());
    load_when_shown(visible, true, reload);

    let run_query = move |next: FeedbackQuery| {
        list.update(|s| s.set_page(next.page));
        query.set_value(next);
        reload();
    };
    let apply = move |_| {
        run_query(FeedbackQuery {
            q: q.get_untracked().trim().to_string(),
            ordering: ordering.get_untracked(),
            ..FeedbackQuery::default()
        });
    };
    let clear = move |_| {
        q.set(String::new());
        ordering.set(ORDERINGS[0].0.to_string());
        run_query(FeedbackQuery::default());
    };
    let on_page = move |page: u32| {
        let mut next = query.get_value();
        next.page = page;
        run_query(next);
    };
    let export = move |_| {
        let current = query.get_value();
        spawn_local(async move {
            match api::export_feedbacks(&services.api(), &current.q, &current.ordering).await {
                Ok(()) => store_success(&store, "导出任务已提交（占位）"),
                Err(e) => store_error(&store, format!("导出失败：{}", e)),
            }
        });
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"点评"</h2>
                <div class="section-actions">
                    <button class="btn btn-secondary" on:click=move |_| reload()>"刷新"</button>
                    <button class="btn btn-secondary" on:click=export>"导出"</button>
                </div>
            </div>
            <div class="filters">
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索点评内容/学员/教师"
                    prop:value=move || q.get()
                    on:input=move |ev| q.set(event_target_value(&ev))
                />
                <select class="form-control" prop:value=move || ordering.get() on:change=move |ev| ordering.set(event_target_value(&ev))>
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
                empty_title="暂无点评记录"
                empty_hint="尝试修改筛选条件"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|f| f.id.clone()
                children=|f| {
                    let pieces = piece_summary(&f);
                    let content = f.teacher_text().unwrap_or("-").to_string();
                    view! {
                        <div class="card">
                            <div class="card-header">
                                <strong>{labels::format_seconds(f.created_at.as_deref())}</strong>
                                <span>"教师：" {f.teacher_label()}</span>
                                <span>
                                    "学员："
                                    <StudentLink student=f.student.clone() name=f.student_label() />
                                </span>
                            </div>
                            <div class="card-body">
                                <div>{content}</div>
                                {(!pieces.is_empty()).then(|| view! { <div class="muted">{pieces}</div> })}
                            </div>
                        </div>
                    }
                }
            />
            <Pager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
        </section>
    }
}
