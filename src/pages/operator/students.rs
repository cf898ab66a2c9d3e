use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::use_student_viewer;
use crate::api::{self, StudentPayload, StudentQuery};
use crate::components::{ListStatus, Modal, Pager};
use crate::context::{use_services, Services};
use crate::list_state::{spawn_list_load, ListState};
use crate::models::{Student, StudentTag};
use crate::pages::load_when_shown;
use crate::store::{store_error, store_success, use_ui_store};

const IMPORT_PATH: &str = "o/students/import";

fn load_students(services: Services, state: RwSignal<ListState<Student>>, query: StudentQuery) {
    let client = services.api();
    spawn_list_load(state, async move { api::list_students(&client, &query).await });
}

/// What the edit modal is working on
#[derive(Debug, Clone, PartialEq)]
enum EditTarget {
    New,
    Existing(Student),
}

#[component]
pub(super) fn StudentsSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let viewer = use_student_viewer();
    let list = RwSignal::new(ListState::<Student>::new(20));
    let search = RwSignal::new(String::new());
    let query = StoredValue::new(StudentQuery::default());
    let tags = RwSignal::new(Vec::<StudentTag>::new());
    let edit_open = RwSignal::new(false);
    let editing = RwSignal::new(EditTarget::New);
    let edit_seq = RwSignal::new(0u32);

    let reload = move || load_students(services, list, query.get_value());
    load_when_shown(visible, true, reload);

    // Tag dictionary for the edit form
    spawn_local(async move {
        match api::list_student_tags(&services.api()).await {
            Ok(found) => tags.set(found),
            Err(e) => log::warn!("[OPS] student tags not loaded: {}", e),
        }
    });

    let run_query = move |next: StudentQuery| {
        list.update(|s| s.set_page(next.page));
        query.set_value(next);
        reload();
    };
    let do_search = move || {
        run_query(StudentQuery {
            search: search.get_untracked().trim().to_string(),
            ..StudentQuery::default()
        });
    };
    let clear = move |_| {
        search.set(String::new());
        run_query(StudentQuery::default());
    };
    let on_page = move |page: u32| {
        let mut next = query.get_value();
        next.page = page;
        run_query(next);
    };

    let open_editor = move |target: EditTarget| {
        editing.set(target);
        edit_seq.update(|n| *n += 1);
        edit_open.set(true);
    };
    let edit_student = move |id: String| {
        spawn_local(async move {
            match api::get_student(&services.api(), &id).await {
                Ok(student) => open_editor(EditTarget::Existing(student)),
                Err(e) => store_error(&store, format!("加载学员失败：{}", e)),
            }
        });
    };
    let export = move |_| {
        let q = query.with_value(|q| q.search.clone());
        spawn_local(async move {
            match api::export_students(&services.api(), &q).await {
                Ok(()) => store_success(&store, "导出任务已提交（占位）"),
                Err(e) => store_error(&store, format!("导出失败：{}", e)),
            }
        });
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"学员管理"</h2>
                <div class="section-actions">
                    <button class="btn btn-primary" on:click=move |_| open_editor(EditTarget::New)>"新增学员"</button>
                    <button class="btn btn-secondary" on:click=move |_| services.navigator().redirect(IMPORT_PATH)>
                        "导入"
                    </button>
                    <button class="btn btn-secondary" on:click=export>"导出"</button>
                </div>
            </div>
            <div class="filters">
                <input
                    type="text"
                    class="form-control"
                    placeholder="搜索昵称/备注名/小鹅通ID"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                    on:keydown=move |ev: KeyboardEvent| {
                        if ev.key() == "Enter" {
                            do_search();
                        }
                    }
                />
                <button class="btn btn-primary" on:click=move |_| do_search()>"搜索"</button>
                <button class="btn btn-secondary" on:click=clear>"清空"</button>
            </div>
            <ListStatus
                loading=Signal::derive(move || list.with(|s| s.is_loading()))
                error=Signal::derive(move || list.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || list.with(|s| s.is_empty()))
                empty_title="暂无学员"
                empty_hint="输入关键词搜索"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|s| s.id.clone()
                children=move |s| {
                    let id = s.id.to_string();
                    let view_id = id.clone();
                    let id_label = format!("ID: {}", id);
                    let op_note = s.op_note.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| "-".to_string());
                    let tag_badges = if s.tag_names.is_empty() {
                        view! { <span>"-"</span> }.into_any()
                    } else {
                        s.tag_names
                            .iter()
                            .map(|t| view! { <span class="badge">{t.clone()}</span> })
                            .collect_view()
                            .into_any()
                    };
                    view! {
                        <div class="card">
                            <div class="card-header">
                                <strong>{s.nickname.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| "-".to_string())}</strong>
                                <span class="muted push-right">{id_label}</span>
                            </div>
                            <div class="card-body">
                                <div><strong>"标签："</strong>{tag_badges}</div>
                                <div><strong>"运营备注："</strong>{op_note}</div>
                                <div class="card-actions">
                                    <button class="btn btn-secondary btn-small" on:click=move |_| viewer.show(view_id.clone())>
                                        "查看"
                                    </button>
                                    <button class="btn btn-primary btn-small" on:click=move |_| edit_student(id.clone())>
                                        "编辑"
                                    </button>
                                </div>
                            </div>
                        </div>
                    }
                }
            />
            <Pager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
            <StudentEditModal open=edit_open target=editing open_seq=edit_seq tags=tags on_saved=move |_: ()| reload() />
        </section>
    }
}

#[component]
fn StudentEditModal(
    open: RwSignal<bool>,
    target: RwSignal<EditTarget>,
    open_seq: RwSignal<u32>,
    tags: RwSignal<Vec<StudentTag>>,
    #[prop(into)] on_saved: Callback<()>,
) -> impl IntoView {
    let services = use_services();
    let nickname = RwSignal::new(String::new());
    let remark_name = RwSignal::new(String::new());
    let xiaoetong_id = RwSignal::new(String::new());
    let tag = RwSignal::new(String::new());
    let op_note = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);
    let is_new = move || target.with(|t| *t == EditTarget::New);

    Effect::new(move |_| {
        open_seq.track();
        error.set(None);
        match target.get_untracked() {
            EditTarget::New => {
                nickname.set(String::new());
                remark_name.set(String::new());
                xiaoetong_id.set(String::new());
                tag.set(String::new());
                op_note.set(String::new());
            }
            EditTarget::Existing(s) => {
                tag.set(s.first_tag().map(|t| t.to_string()).unwrap_or_default());
                nickname.set(s.nickname.unwrap_or_default());
                remark_name.set(s.remark_name.unwrap_or_default());
                xiaoetong_id.set(s.xiaoetong_id.unwrap_or_default());
                op_note.set(s.op_note.unwrap_or_default());
            }
        }
    });

    let save = move |_| {
        error.set(None);
        let payload = StudentPayload {
            nickname: nickname.get_untracked().trim().to_string(),
            remark_name: remark_name.get_untracked().trim().to_string(),
            op_note: op_note.get_untracked().trim().to_string(),
            tags: None,
        }
        .with_tag(Some(tag.get_untracked()));
        let existing = match target.get_untracked() {
            EditTarget::New => None,
            EditTarget::Existing(s) => Some(s.id.to_string()),
        };
        let xet_id = xiaoetong_id.get_untracked().trim().to_string();
        if existing.is_none() && xet_id.is_empty() {
            error.set(Some("请填写小鹅通ID".to_string()));
            return;
        }
        saving.set(true);
        spawn_local(async move {
            let client = services.api();
            let result = match &existing {
                Some(id) => api::update_student(&client, id, &payload).await,
                None => api::create_student(&client, &payload, &xet_id).await,
            };
            saving.set(false);
            match result {
                Ok(()) => {
                    open.set(false);
                    on_saved.run(());
                }
                Err(e) => {
                    log::error!("[OPS] save student failed: {}", e);
                    let msg = e.to_string();
                    error.set(Some(if msg.is_empty() { "保存失败".to_string() } else { msg }));
                }
            }
        });
    };

    let title = Signal::derive(move || if is_new() { "新增学员" } else { "编辑学员" }.to_string());

    view! {
        <Modal open=open title=title>
            <div class="form-group">
                <label>"昵称"</label>
                <input
                    type="text"
                    class="form-control"
                    prop:value=move || nickname.get()
                    on:input=move |ev| nickname.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label>"备注名"</label>
                <input
                    type="text"
                    class="form-control"
                    prop:value=move || remark_name.get()
                    on:input=move |ev| remark_name.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label>"小鹅通ID"</label>
                <input
                    type="text"
                    class="form-control"
                    disabled=move || !is_new()
                    prop:value=move || xiaoetong_id.get()
                    on:input=move |ev| xiaoetong_id.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label>"标签"</label>
                <select
                    class="form-control"
                    prop:value=move || {
                        tags.track();
                        tag.get()
                    }
                    on:change=move |ev| tag.set(event_target_value(&ev))
                >
                    <option value="">"未选择标签"</option>
                    <For
                        each=move || tags.get()
                        key=|t| t.id.clone()
                        children=|t| {
                            let name = t.name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| format!("标签{}", t.id));
                            view! { <option value=t.id.to_string()>{name}</option> }
                        }
                    />
                </select>
            </div>
            <div class="form-group">
                <label>"运营备注"</label>
                <textarea
                    class="form-control"
                    rows="4"
                    prop:value=move || op_note.get()
                    on:input=move |ev| op_note.set(event_target_value(&ev))
                ></textarea>
            </div>
            {move || error.get().map(|e| view! { <div class="form-error">{e}</div> })}
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"关闭"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=save>
                    {move || if is_new() { "创建" } else { "保存" }}
                </button>
            </div>
        </Modal>
    }
}
