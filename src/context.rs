//! Application Context
//!
//! Services are built once at mount and handed to every page through the
//! Leptos Context API.

use std::rc::Rc;

use leptos::prelude::*;

use crate::auth::Auth;
use crate::config::AppConfig;
use crate::http::{ApiClient, FetchTransport, HttpTransport};
use crate::models::UserInfo;
use crate::navigator::{BrowserNavigator, Navigator};
use crate::session::SessionStore;
use crate::storage::{BrowserStorage, KeyValueStore, StorageArea};

/// Session, HTTP client, auth and navigation for one page
#[derive(Clone)]
pub struct AppServices {
    pub config: Rc<AppConfig>,
    pub session: SessionStore,
    pub api: Rc<ApiClient>,
    pub auth: Rc<Auth>,
    pub navigator: Rc<dyn Navigator>,
}

impl AppServices {
    pub fn new(
        config: AppConfig,
        local: Rc<dyn KeyValueStore>,
        session_area: Rc<dyn KeyValueStore>,
        transport: Rc<dyn HttpTransport>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let config = Rc::new(config);
        let session = SessionStore::new(local, session_area);
        let api = Rc::new(ApiClient::new(
            transport,
            session.clone(),
            navigator.clone(),
            config.clone(),
        ));
        let auth = Rc::new(Auth::new(
            api.clone(),
            session.clone(),
            navigator.clone(),
            config.clone(),
        ));
        Self {
            config,
            session,
            api,
            auth,
            navigator,
        }
    }

    /// Real browser storage, `fetch` and `window.location`
    pub fn browser(config: AppConfig) -> Self {
        Self::new(
            config,
            Rc::new(BrowserStorage::new(StorageArea::Local)),
            Rc::new(BrowserStorage::new(StorageArea::Session)),
            Rc::new(FetchTransport),
            Rc::new(BrowserNavigator),
        )
    }

    /// Person id of the signed-in user, as sent in filters and payloads
    pub fn person_id(&self) -> Option<String> {
        self.session
            .get_user_info()
            .and_then(|u: UserInfo| u.person_id)
            .map(|id| id.to_string())
    }
}

/// Copyable handle to [`AppServices`] for use inside view closures
#[derive(Clone, Copy)]
pub struct Services(StoredValue<AppServices, LocalStorage>);

impl Services {
    pub fn new(services: AppServices) -> Self {
        Self(StoredValue::new_local(services))
    }

    pub fn api(&self) -> Rc<ApiClient> {
        self.0.with_value(|s| s.api.clone())
    }

    pub fn auth(&self) -> Rc<Auth> {
        self.0.with_value(|s| s.auth.clone())
    }

    pub fn session(&self) -> SessionStore {
        self.0.with_value(|s| s.session.clone())
    }

    pub fn config(&self) -> Rc<AppConfig> {
        self.0.with_value(|s| s.config.clone())
    }

    pub fn navigator(&self) -> Rc<dyn Navigator> {
        self.0.with_value(|s| s.navigator.clone())
    }

    pub fn person_id(&self) -> Option<String> {
        self.0.with_value(|s| s.person_id())
    }
}

pub fn provide_services(services: AppServices) {
    provide_context(Services::new(services));
}

pub fn use_services() -> Services {
    expect_context::<Services>()
}
