//! Course Ops Frontend App
//!
//! One wasm bundle serves every entry page; the page to mount is picked
//! from the current path.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::components::NoticeToast;
use crate::context::{provide_services, AppServices};
use crate::navigator::Route;
use crate::pages::{LoginPage, OperatorPage, ResearcherPage, TeacherPage};
use crate::store::UiState;

fn current_route() -> Route {
    let pathname = web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default();
    Route::from_path(&pathname)
}

#[component]
pub fn App(services: AppServices) -> impl IntoView {
    provide_services(services);
    provide_context(Store::new(UiState::default()));

    let route = current_route();
    log::info!("[APP] mounting {:?} page", route);

    let page = match route {
        Route::Login => view! { <LoginPage /> }.into_any(),
        Route::Teacher => view! { <TeacherPage /> }.into_any(),
        Route::Researcher => view! { <ResearcherPage /> }.into_any(),
        Route::Operator => view! { <OperatorPage /> }.into_any(),
    };

    view! {
        <div class="app-layout">
            {page}
            <NoticeToast />
        </div>
    }
}
