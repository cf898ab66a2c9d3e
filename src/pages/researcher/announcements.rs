//! Announcement management: list, create/edit modal, inline delete.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, AnnouncementPayload};
use crate::components::{DeleteConfirmButton, ListStatus, Modal, Pager};
use crate::context::use_services;
use crate::labels::{self, ANNOUNCEMENT_TYPES};
use crate::list_state::ListState;
use crate::markdown::render_announcement;
use crate::models::Announcement;
use crate::pages::{load_announcements, load_when_shown};
use crate::store::{store_error, store_success, use_ui_store};

#[component]
pub(super) fn AnnouncementsSection(visible: Signal<bool>) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let list = RwSignal::new(ListState::<Announcement>::new(10));
    let editing = RwSignal::new(None::<Announcement>);
    let modal_open = RwSignal::new(false);
    // Bumped on every open so the form re-initializes
    let open_seq = RwSignal::new(0u32);

    let reload = move || load_announcements(services, list);
    load_when_shown(visible, false, reload);

    let on_page = move |page: u32| {
        list.update(|s| s.set_page(page));
        reload();
    };

    let open_modal = move |announcement: Option<Announcement>| {
        editing.set(announcement);
        open_seq.update(|n| *n += 1);
        modal_open.set(true);
    };

    let delete = move |id: String| {
        spawn_local(async move {
            match api::delete_announcement(&services.api(), &id).await {
                Ok(()) => {
                    store_success(&store, "公告已删除");
                    reload();
                }
                Err(e) => {
                    log::error!("[RESEARCHER] delete announcement {} failed: {}", id, e);
                    store_error(&store, format!("删除失败：{}", e));
                }
            }
        });
    };

    view! {
        <section class="content-section" style:display=move || if visible.get() { "" } else { "none" }>
            <div class="section-header">
                <h2>"公告管理"</h2>
                <button class="btn btn-primary" on:click=move |_| open_modal(None)>"发布新公告"</button>
            </div>
            <ListStatus
                loading=Signal::derive(move || list.with(|s| s.is_loading()))
                error=Signal::derive(move || list.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || list.with(|s| s.is_empty()))
                empty_title="暂无公告"
                empty_hint="点击上方\"发布新公告\"按钮创建第一条公告"
            />
            <For
                each=move || list.with(|s| s.items.clone())
                key=|a| (a.id.clone(), a.content.clone(), a.start_at.clone(), a.end_at.clone())
                children=move |a| {
                    let id = a.id.to_string();
                    let kind_class = format!("announcement-type {}", a.kind.clone().unwrap_or_default());
                    let kind = labels::announcement_type(a.kind.as_deref());
                    let html = render_announcement(a.content.as_deref().unwrap_or_default());
                    let start = labels::format_seconds(a.start_at.as_deref());
                    let end = a.end_at.as_deref().filter(|e| !e.is_empty()).map(|e| labels::format_seconds(Some(e)));
                    let created = labels::format_seconds(a.created_at.as_deref());
                    let edit_target = a.clone();
                    view! {
                        <div class="announcement-item">
                            <div class="announcement-header">
                                <span class=kind_class>{kind}</span>
                                <div class="announcement-actions">
                                    <button
                                        class="btn btn-small btn-secondary"
                                        on:click=move |_| open_modal(Some(edit_target.clone()))
                                    >
                                        "编辑"
                                    </button>
                                    <DeleteConfirmButton on_confirm=move |_: ()| delete(id.clone()) />
                                </div>
                            </div>
                            <div class="announcement-content markdown-body" inner_html=html></div>
                            <div class="announcement-meta">
                                <div class="announcement-time">
                                    <span>"开始时间: " {start}</span>
                                    {match end {
                                        Some(end) => view! { <span>"结束时间: " {end}</span> }.into_any(),
                                        None => view! { <span>"长期有效"</span> }.into_any(),
                                    }}
                                </div>
                                <span>"发布时间: " {created}</span>
                            </div>
                        </div>
                    }
                }
            />
            <Pager state=Signal::derive(move || list.with(|s| s.page)) on_page=on_page />
            <AnnouncementModal open=modal_open editing=editing open_seq=open_seq on_saved=move |_: ()| reload() />
        </section>
    }
}

#[component]
fn AnnouncementModal(
    open: RwSignal<bool>,
    editing: RwSignal<Option<Announcement>>,
    open_seq: RwSignal<u32>,
    #[prop(into)] on_saved: Callback<()>,
) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let kind = RwSignal::new(String::new());
    let content = RwSignal::new(String::new());
    let start_at = RwSignal::new(String::new());
    let end_at = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);

    Effect::new(move |_| {
        open_seq.track();
        let current = editing.get_untracked();
        error.set(None);
        match current {
            Some(a) => {
                kind.set(a.kind.unwrap_or_default());
                content.set(a.content.unwrap_or_default());
                start_at.set(labels::to_datetime_local(a.start_at.as_deref()));
                end_at.set(labels::to_datetime_local(a.end_at.as_deref()));
            }
            None => {
                kind.set(ANNOUNCEMENT_TYPES[0].0.to_string());
                content.set(String::new());
                start_at.set(labels::now_datetime_local());
                end_at.set(String::new());
            }
        }
    });

    let save = move |_| {
        let text = content.get_untracked().trim().to_string();
        if text.is_empty() {
            error.set(Some("请填写公告内容".to_string()));
            return;
        }
        let Some(start) = labels::from_datetime_local(&start_at.get_untracked()) else {
            error.set(Some("请填写开始时间".to_string()));
            return;
        };
        let payload = AnnouncementPayload {
            kind: kind.get_untracked(),
            content: text,
            start_at: start,
            end_at: labels::from_datetime_local(&end_at.get_untracked()),
            publisher: services.person_id(),
        };
        let target = editing.get_untracked().map(|a| a.id.to_string());
        saving.set(true);
        spawn_local(async move {
            let client = services.api();
            let result = match &target {
                Some(id) => api::update_announcement(&client, id, &payload).await,
                None => api::create_announcement(&client, &payload).await,
            };
            saving.set(false);
            match result {
                Ok(()) => {
                    open.set(false);
                    store_success(&store, if target.is_some() { "公告更新成功" } else { "公告发布成功" });
                    on_saved.run(());
                }
                Err(e) => {
                    log::error!("[RESEARCHER] save announcement failed: {}", e);
                    error.set(Some(format!("保存失败：{}", e)));
                }
            }
        });
    };

    let title = Signal::derive(move || {
        let title = if editing.with(Option::is_some) { "编辑公告" } else { "发布新公告" };
        title.to_string()
    });

    view! {
        <Modal open=open title=title>
            <div class="form-group">
                <label>"公告类型"</label>
                <select class="form-control" prop:value=move || kind.get() on:change=move |ev| kind.set(event_target_value(&ev))>
                    {ANNOUNCEMENT_TYPES
                        .iter()
                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>
            </div>
            <div class="form-group">
                <label>"公告内容（支持 Markdown）"</label>
                <textarea
                    class="form-control"
                    rows="6"
                    prop:value=move || content.get()
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
            </div>
            <div class="form-row">
                <div class="form-group">
                    <label>"开始时间"</label>
                    <input
                        type="datetime-local"
                        class="form-control"
                        prop:value=move || start_at.get()
                        on:input=move |ev| start_at.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label>"结束时间（可选）"</label>
                    <input
                        type="datetime-local"
                        class="form-control"
                        prop:value=move || end_at.get()
                        on:input=move |ev| end_at.set(event_target_value(&ev))
                    />
                </div>
            </div>
            {move || error.get().map(|e| view! { <div class="form-error">{e}</div> })}
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| open.set(false)>"取消"</button>
                <button class="btn btn-primary" disabled=move || saving.get() on:click=save>
                    {move || if saving.get() { "保存中..." } else { "保存" }}
                </button>
            </div>
        </Modal>
    }
}
