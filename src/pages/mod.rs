//! Role Pages
//!
//! One page per role plus the login view. Role pages sit behind
//! [`RoleGate`], which runs the route guard before anything loads.

mod login;
mod operator;
mod researcher;
mod teacher;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, AnnouncementQuery, ReminderQuery};
use crate::context::{use_services, Services};
use crate::list_state::{spawn_list_load, ListState};
use crate::models::{Announcement, Reminder, Role};
use crate::store::{use_ui_store, UiStateStoreFields};

pub use login::LoginPage;
pub use operator::OperatorPage;
pub use researcher::ResearcherPage;
pub use teacher::TeacherPage;

// ========================
// Shared Board Loads
// ========================

/// Load one page of announcements, newest first
pub(crate) fn load_announcements(services: Services, state: RwSignal<ListState<Announcement>>) {
    let query = AnnouncementQuery {
        page: state.with_untracked(|s| s.page.page),
        ..AnnouncementQuery::default()
    };
    let client = services.api();
    spawn_list_load(state, async move { api::list_announcements(&client, &query).await });
}

/// Load one page of the active reminders addressed to the current user
pub(crate) fn load_board_reminders(services: Services, state: RwSignal<ListState<Reminder>>) {
    let query = ReminderQuery {
        page: state.with_untracked(|s| s.page.page),
        ..ReminderQuery::board()
    };
    let client = services.api();
    spawn_list_load(state, async move { api::list_reminders(&client, &query).await });
}

/// Run `load` whenever `visible` turns true; with `once`, only the first time
pub(crate) fn load_when_shown(visible: Signal<bool>, once: bool, load: impl Fn() + 'static) {
    let loaded = StoredValue::new(false);
    Effect::new(move |_| {
        if !visible.get() || (once && loaded.get_value()) {
            return;
        }
        loaded.set_value(true);
        untrack(&load);
    });
}

/// Renders `children` once the session is valid and matches `role`
#[component]
pub fn RoleGate(role: Role, children: ChildrenFn) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();
    let (ready, set_ready) = signal(false);

    spawn_local(async move {
        let auth = services.auth();
        if auth.route_guard(Some(role)).await {
            store.user().set(auth.current_user());
            set_ready.set(true);
        }
    });

    view! {
        <Show when=move || ready.get() fallback=|| view! { <div class="loading">"加载中..."</div> }>
            {children()}
        </Show>
    }
}

/// Page header with the signed-in user and a logout button
#[component]
pub fn UserBar(#[prop(into)] title: String) -> impl IntoView {
    let services = use_services();
    let store = use_ui_store();

    let user_label = move || {
        store
            .user()
            .get()
            .map(|u| {
                let name = u.name.filter(|n| !n.is_empty()).unwrap_or(u.username);
                format!("{}（{}）", name, u.role.label())
            })
            .unwrap_or_default()
    };

    let logout = move |_| {
        spawn_local(async move {
            services.auth().logout().await;
        });
    };

    view! {
        <header class="page-header">
            <h1>{title}</h1>
            <div class="user-info">
                <span class="user-name">{user_label}</span>
                <button class="btn btn-secondary btn-small" on:click=logout>"退出登录"</button>
            </div>
        </header>
    }
}
