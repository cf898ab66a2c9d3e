//! Batch task creation: one assignee, many students, one generated batch id.

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

use crate::api::{self, BulkEvalTasks};
use crate::components::Modal;
use crate::context::use_services;
use crate::labels;
use crate::models::{EntityId, PersonRole, Student, TaskBatch};
use crate::store::{store_error, store_success, use_ui_store};
use crate::validation::non_blank;

/// Student picked into the batch draft
#[derive(Debug, Clone, PartialEq)]
struct DraftStudent {
    id: EntityId,
    nickname: String,
}

/// Add students not already in the draft; returns how many were added
fn merge_students(draft: &mut Vec<DraftStudent>, incoming: impl IntoIterator<Item = DraftStudent>) -> usize {
    let before = draft.len();
    for student in incoming {
        if !draft.iter().any(|s| s.id == student.id) {
            draft.push(student);
        }
    }
    draft.len() - before
}

#[derive(Debug, Clone, PartialEq)]
enum SearchState {
    Idle,
    NeedKeyword,
    Found(Vec<Student>),
    Failed(String),
}

#[component]
pub(super) fn BatchModal(
    open: RwSignal<bool>,
    /// Bumped on every open so the draft starts empty
    open_seq: RwSignal<u32>,
    teachers: RwSignal<Vec<PersonRole>>,
    #[prop(into)] on_created: Callback<String>,
) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let assignee = RwSignal::new(String::new());
    let note = RwSignal::new(String::new());
    let keyword = RwSignal::new(String::new());
    let results = RwSignal::new(SearchState::Idle);
    let draft = RwSignal::new(Vec::<DraftStudent>::new());
    let history_open = RwSignal::new(false);
    let history = RwSignal::new(None::<Result<Vec<TaskBatch>, String>>);
    let saving = RwSignal::new(false);

    Effect::new(move |_| {
        open_seq.track();
        assignee.set(String::new());
        note.set(String::new());
        keyword.set(String::new());
        results.set(SearchState::Idle);
        draft.set(Vec::new());
        history_open.set(false);
    });

    let search = move || {
        let kw = keyword.get_untracked().trim().to_string();
        if kw.is_empty() {
            results.set(SearchState::NeedKeyword);
            return;
        }
        spawn_local(async move {
            match api::search_students_by_nickname(&services.api(), &kw).await {
                Ok(found) => results.set(SearchState::Found(found)),
                Err(e) => results.set(SearchState::Failed(e.to_string())),
            }
        });
    };

    let add = move |student: Student| {
        let nickname = student.nickname.clone().unwrap_or_default();
        draft.update(|d| {
            merge_students(d, [DraftStudent { id: student.id, nickname }]);
        });
    };
    let remove = move |id: EntityId| draft.update(|d| d.retain(|s| s.id != id));

    let toggle_history = move |_| {
        if history_open.get_untracked() {
            history_open.set(false);
            return;
        }
        history.set(None);
        history_open.set(true);
        spawn_local(async move {
            let loaded = api::list_task_batches(&services.api()).await.map_err(|e| e.to_string());
            history.set(Some(loaded));
        });
    };

    let import_batch = move |batch_id: String| {
        spawn_local(async move {
            match api::batch_students(&services.api(), &batch_id).await {
                Ok(students) => {
                    let incoming = students
                        .into_iter()
                        .map(|(id, nickname)| DraftStudent { id, nickname });
                    draft.update(|d| {
                        merge_students(d, incoming);
                    });
                    store_success(&store, "已导入历史批次学员");
                }
                Err(e) => store_error(&store, format!("导入失败：{}", e)),
            }
        });
    };

    let send = move |_| {
        let assignee_id = assignee.get_untracked();
        if assignee_id.is_empty() {
            store_error(&store, "请选择负责人教师");
            return;
        }
        let students: Vec<String> = draft.with_untracked(|d| d.iter().map(|s| s.id.to_string()).collect());
        if students.is_empty() {
            store_error(&store, "请先添加至少一名学员");
            return;
        }
        let batch = BulkEvalTasks {
            assignee: assignee_id,
            students,
            note: non_blank(&note.get_untracked()),
            batch_id: Uuid::new_v4().to_string(),
        };
        saving.set(true);
        spawn_local(async move {
            let result = api::create_eval_task_batch(&services.api(), &batch).await;
            saving.set(false);
            match result {
                Ok(()) => {
                    log::info!("[RESEARCHER] batch {} created with {} students", batch.batch_id, batch.students.len());
                    open.set(false);
                    store_success(&store, "批次创建成功");
                    on_created.run(batch.batch_id);
                }
                Err(e) => store_error(&store, format!("批次创建失败：{}", e)),
            }
        });
    };

    view! {
        <Modal open=open title="创建任务批次" class="modal-wide">
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
                    rows="2"
                    prop:value=move || note.get()
                    on:input=move |ev| note.set(event_target_value(&ev))
                ></textarea>
            </div>

            <div class="form-group">
                <label>"添加学员"</label>
                <div class="input-row">
                    <input
                        type="text"
                        class="form-control"
                        placeholder="输入昵称搜索"
                        prop:value=move || keyword.get()
                        on:input=move |ev| keyword.set(event_target_value(&ev))
                        on:keydown=move |ev: KeyboardEvent| {
                            if ev.key() == "Enter" {
                                ev.prevent_default();
                                search();
                            }
                        }
                    />
                    <button class="btn btn-secondary" on:click=move |_| search()>"搜索"</button>
                    <button class="btn btn-secondary" on:click=toggle_history>"从历史批次导入"</button>
                </div>
                <div class="search-results">
                    {move || match results.get() {
                        SearchState::Idle => ().into_any(),
                        SearchState::NeedKeyword => view! { <div class="empty-state"><em>"请输入关键词"</em></div> }.into_any(),
                        SearchState::Failed(msg) => {
                            view! { <div class="empty-state"><em>"搜索失败：" {msg}</em></div> }.into_any()
                        }
                        SearchState::Found(list) if list.is_empty() => {
                            view! { <div class="empty-state"><em>"未找到匹配学员"</em></div> }.into_any()
                        }
                        SearchState::Found(list) => {
                            list.into_iter()
                                .map(|student| {
                                    let label = student.option_label();
                                    view! {
                                        <div class="list-item">
                                            <span>{label}</span>
                                            <button class="btn btn-small" on:click=move |_| add(student.clone())>"添加"</button>
                                        </div>
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </div>

            <Show when=move || history_open.get()>
                <div class="batch-history">
                    {move || match history.get() {
                        None => view! { <div class="empty-state"><em>"加载中..."</em></div> }.into_any(),
                        Some(Err(msg)) => view! { <div class="empty-state"><em>"加载失败：" {msg}</em></div> }.into_any(),
                        Some(Ok(list)) if list.is_empty() => {
                            view! { <div class="empty-state"><em>"暂无历史批次"</em></div> }.into_any()
                        }
                        Some(Ok(list)) => {
                            list.into_iter()
                                .map(|b| {
                                    let range = format!(
                                        "共 {} 条，{} ~ {}",
                                        b.count,
                                        labels::format_minutes(b.first_created_at.as_deref()),
                                        labels::format_minutes(b.last_created_at.as_deref()),
                                    );
                                    let id = b.batch_id.clone();
                                    view! {
                                        <div class="list-item">
                                            <div>
                                                <div><strong>{b.batch_id}</strong></div>
                                                <div class="secondary">{range}</div>
                                            </div>
                                            <button class="btn btn-small" on:click=move |_| import_batch(id.clone())>"导入"</button>
                                        </div>
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </Show>

            <div class="form-group">
                <label>{move || format!("已选学员（{}）", draft.with(Vec::len))}</label>
                <div class="selected-list">
                    <For
                        each=move || draft.get()
                        key=|s| s.id.clone()
                        children=move |s| {
                            let id = s.id.clone();
                            let label = if s.nickname.is_empty() {
                                format!("#{}", s.id)
                            } else {
                                format!("{} #{}", s.nickname, s.id)
                            };
                            view! {
                                <span class="tag removable">
                                    {label}
                                    <button class="tag-remove" on:click=move |_| remove(id.clone())>"×"</button>
                                </span>
                            }
                        }
                    />
                </div>
            </div>

            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"取消"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=send>
                    {move || if saving.get() { "创建中..." } else { "创建批次" }}
                </button>
            </div>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, nickname: &str) -> DraftStudent {
        DraftStudent {
            id: EntityId::new(id),
            nickname: nickname.to_string(),
        }
    }

    #[test]
    fn test_merge_skips_students_already_drafted() {
        let mut draft = vec![student("1", "amy")];
        let added = merge_students(&mut draft, [student("1", "amy"), student("2", "bo"), student("2", "bo")]);
        assert_eq!(added, 1);
        assert_eq!(draft, vec![student("1", "amy"), student("2", "bo")]);
    }
}
