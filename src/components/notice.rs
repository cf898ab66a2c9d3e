use leptos::prelude::*;

use crate::store::{use_ui_store, NoticeKind, UiStateStoreFields};

/// Toast for the current notice in the UI store
#[component]
pub fn NoticeToast() -> impl IntoView {
    let store = use_ui_store();
    view! {
        {move || {
            store.notice().get().map(|notice| {
                let class = match notice.kind {
                    NoticeKind::Success => "toast toast-success",
                    NoticeKind::Error => "toast toast-error",
                };
                view! { <div class=class>{notice.text}</div> }
            })
        }}
    }
}
