//! Test doubles for the browser seams.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::AppConfig;
use crate::context::AppServices;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, HttpRequest, HttpResponse, HttpTransport};
use crate::navigator::Navigator;
use crate::session::SessionStore;
use crate::storage::MemoryStorage;

/// Replays queued responses in order; an empty queue is a network error
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn push(&self, response: HttpResponse) {
        self.responses.borrow_mut().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ApiError::Network("no scripted response".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.visits.borrow_mut().push(path.to_string());
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        content_type: Some("application/json; charset=utf-8".to_string()),
        body: body.to_string(),
    }
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        content_type: Some("text/plain".to_string()),
        body: body.to_string(),
    }
}

/// Fully wired services over in-memory doubles
pub struct TestHarness {
    pub local: Rc<MemoryStorage>,
    pub session_area: Rc<MemoryStorage>,
    pub session: SessionStore,
    pub transport: Rc<ScriptedTransport>,
    pub navigator: Rc<RecordingNavigator>,
    pub client: Rc<ApiClient>,
    pub services: AppServices,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let local = Rc::new(MemoryStorage::new());
        let session_area = Rc::new(MemoryStorage::new());
        let transport = Rc::new(ScriptedTransport::default());
        let navigator = Rc::new(RecordingNavigator::default());
        let services = AppServices::new(
            config,
            local.clone(),
            session_area.clone(),
            transport.clone(),
            navigator.clone(),
        );
        Self {
            local,
            session_area,
            session: services.session.clone(),
            transport,
            navigator,
            client: services.api.clone(),
            services,
        }
    }
}
