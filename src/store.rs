//! Page Chrome State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity over the state
//! every page shares: the signed-in user, collapse flags and the toast.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::models::UserInfo;
use crate::session::SessionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient toast message
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u32,
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Clone, Debug, Default, Store)]
pub struct UiState {
    /// Signed-in user, set once the route guard passes
    pub user: Option<UserInfo>,
    /// Teacher board folded away
    pub board_collapsed: bool,
    /// Ops sidebar folded away
    pub sidebar_collapsed: bool,
    pub notice: Option<Notice>,
    /// Bumped for every notice so a stale timer can't hide a newer one
    pub notice_seq: u32,
}

pub type UiStore = Store<UiState>;

pub fn use_ui_store() -> UiStore {
    expect_context::<UiStore>()
}

// ========================
// Store Helper Functions
// ========================

const NOTICE_MS: u32 = 3000;

pub fn store_show_notice(store: &UiStore, kind: NoticeKind, text: impl Into<String>) {
    let seq = store.notice_seq().get_untracked().wrapping_add(1);
    store.notice_seq().set(seq);
    store.notice().set(Some(Notice {
        id: seq,
        kind,
        text: text.into(),
    }));
    let store = *store;
    spawn_local(async move {
        TimeoutFuture::new(NOTICE_MS).await;
        if store.notice_seq().get_untracked() == seq {
            store.notice().set(None);
        }
    });
}

pub fn store_success(store: &UiStore, text: impl Into<String>) {
    store_show_notice(store, NoticeKind::Success, text);
}

pub fn store_error(store: &UiStore, text: impl Into<String>) {
    store_show_notice(store, NoticeKind::Error, text);
}

/// Flip a persisted collapse flag and write it back to local storage
pub fn store_toggle_flag(flag: impl Get<Value = bool> + Set<Value = bool>, session: &SessionStore, key: &str) {
    let next = !flag.get();
    flag.set(next);
    session.set_storage(key, &next, true);
}
