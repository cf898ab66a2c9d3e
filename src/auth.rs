//! Authentication
//!
//! Login/logout against the backend plus the route guard every role page
//! runs before loading anything.

use std::rc::Rc;

use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ApiRequest, HttpMethod, QueryParams, RequestBody};
use crate::models::{Credentials, Role, UserInfo};
use crate::navigator::{Navigator, Route};
use crate::session::SessionStore;

pub struct Auth {
    api: Rc<ApiClient>,
    session: SessionStore,
    navigator: Rc<dyn Navigator>,
    config: Rc<AppConfig>,
}

impl Auth {
    pub fn new(
        api: Rc<ApiClient>,
        session: SessionStore,
        navigator: Rc<dyn Navigator>,
        config: Rc<AppConfig>,
    ) -> Self {
        Self {
            api,
            session,
            navigator,
            config,
        }
    }

    /// Authenticate and persist the session; a reply without a token or a
    /// readable `user` with a role is an error
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<UserInfo> {
        let request = ApiRequest::new(HttpMethod::Post, "/auth/login/")
            .body(RequestBody::json(credentials)?)
            .allow_unauthorized();
        let value = self.api.send(request).await?;

        let malformed = || ApiError::MalformedResponse("登录响应格式错误".to_string());
        let token = value
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(malformed)?
            .to_string();
        let user: UserInfo = value
            .get("user")
            .cloned()
            .and_then(|u| serde_json::from_value(u).ok())
            .ok_or_else(malformed)?;

        self.session.set_token(&token, credentials.remember_me);
        self.session.set_user_info(&user, credentials.remember_me);
        log::info!("[AUTH] logged in as {} ({})", user.username, user.role.as_str());
        Ok(user)
    }

    /// Best-effort server logout; local credentials are always dropped
    pub async fn logout(&self) {
        if let Err(e) = self.api.post("/auth/logout/", &json!({})).await {
            log::warn!("[AUTH] logout request failed: {}", e);
        }
        self.session.clear();
        self.navigator.go(Route::Login);
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.get_token().is_some() && self.session.get_user_info().is_some()
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.session.get_user_info()
    }

    pub fn current_role(&self) -> Option<Role> {
        self.session.current_role()
    }

    /// Dashboard for an existing session. A stored role no page serves
    /// clears the session so the login form shows instead of looping.
    pub fn resume_route(&self) -> Option<Route> {
        if !self.is_authenticated() {
            return None;
        }
        match self.current_role()? {
            Role::Unknown => {
                log::warn!("[AUTH] stored session has an unknown role, clearing it");
                self.session.clear();
                None
            }
            role => Some(Route::for_role(role)),
        }
    }

    pub fn has_permission(&self, role: Role) -> bool {
        self.current_role() == Some(role)
    }

    pub async fn refresh_token(&self) -> ApiResult<Value> {
        match self.api.post("/auth/refresh/", &json!({})).await {
            Ok(value) => {
                if let Some(token) = value.get("token").and_then(Value::as_str) {
                    self.session.set_token(token, self.session.is_remembered());
                }
                Ok(value)
            }
            Err(e) => {
                log::error!("[AUTH] token refresh failed: {}", e);
                self.logout().await;
                Err(e)
            }
        }
    }

    /// `false` only on an explicit `valid: false` or a 401; other failures
    /// follow `validate_fail_open`.
    pub async fn validate_token(&self) -> bool {
        match self.api.get("/auth/validate/", QueryParams::new()).await {
            Ok(value) => value.get("valid") != Some(&Value::Bool(false)),
            Err(ApiError::Unauthorized) => false,
            Err(e) => {
                log::warn!("[AUTH] token validation failed: {}", e);
                self.config.validate_fail_open
            }
        }
    }

    fn send_to_login(&self) {
        if !self.api.redirected_to_login() {
            self.navigator.go(Route::Login);
        }
    }

    /// Gate a page on a live session and, when given, a matching role
    pub async fn route_guard(&self, required_role: Option<Role>) -> bool {
        if !self.is_authenticated() {
            log::info!("[AUTH] no session, redirecting to login");
            self.send_to_login();
            return false;
        }

        if !self.validate_token().await {
            log::info!("[AUTH] session rejected by server");
            self.session.clear();
            self.send_to_login();
            return false;
        }

        if let Some(role) = required_role {
            if !self.has_permission(role) {
                log::warn!(
                    "[AUTH] role mismatch: page needs {}, user is {:?}",
                    role.as_str(),
                    self.current_role().map(|r| r.as_str())
                );
                self.send_to_login();
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use crate::testing::{json_response, TestHarness};

    fn sign_in(harness: &TestHarness, role: Role) {
        harness.session.set_token("tok", false);
        harness.session.set_user_info(
            &UserInfo {
                id: None,
                username: "amy".to_string(),
                role,
                person_id: Some(EntityId::new("3")),
                name: None,
            },
            false,
        );
    }

    fn credentials(remember_me: bool) -> Credentials {
        Credentials {
            username: "amy".to_string(),
            password: "secret".to_string(),
            role: Role::Researcher,
            remember_me,
        }
    }

    #[tokio::test]
    async fn test_login_stores_session_by_remember_flag() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(
            200,
            json!({"token": "t1", "user": {"username": "amy", "role": "researcher", "person_id": 3}}),
        ));

        let user = harness.services.auth.login(&credentials(true)).await.unwrap();
        assert_eq!(user.username, "amy");
        assert_eq!(harness.session.get_token().as_deref(), Some("t1"));
        assert!(harness.session.is_remembered());
        assert_eq!(harness.session.current_role(), Some(Role::Researcher));

        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.url, "/auth/login/");
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"username": "amy", "password": "secret", "role": "researcher"}));
    }

    #[tokio::test]
    async fn test_login_without_token_is_malformed() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(200, json!({"ok": true})));
        let err = harness.services.auth.login(&credentials(false)).await.unwrap_err();
        assert_eq!(err.to_string(), "登录响应格式错误");
        assert!(!harness.services.auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_user_without_role_is_malformed() {
        let harness = TestHarness::new();
        harness
            .transport
            .push(json_response(200, json!({"token": "t1", "user": {"username": "amy"}})));
        let err = harness.services.auth.login(&credentials(false)).await.unwrap_err();
        assert_eq!(err.to_string(), "登录响应格式错误");
        assert!(harness.session.get_token().is_none());
    }

    #[test]
    fn test_resume_route_for_known_role() {
        let harness = TestHarness::new();
        assert_eq!(harness.services.auth.resume_route(), None);
        sign_in(&harness, Role::Operator);
        assert_eq!(harness.services.auth.resume_route(), Some(Route::Operator));
    }

    #[test]
    fn test_resume_route_unknown_role_clears_session() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Unknown);
        assert_eq!(harness.services.auth.resume_route(), None);
        assert!(!harness.services.auth.is_authenticated());
        assert!(harness.session.get_token().is_none());
        assert!(harness.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Teacher);
        harness.transport.push(json_response(500, json!({})));
        harness.services.auth.logout().await;
        assert!(!harness.services.auth.is_authenticated());
        assert_eq!(harness.navigator.visits(), vec!["index.html"]);
    }

    #[tokio::test]
    async fn test_route_guard_without_session_redirects() {
        let harness = TestHarness::new();
        assert!(!harness.services.auth.route_guard(Some(Role::Teacher)).await);
        assert_eq!(harness.navigator.visits(), vec!["index.html"]);
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_route_guard_passes_for_matching_role() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Operator);
        harness.transport.push(json_response(200, json!({"valid": true})));
        assert!(harness.services.auth.route_guard(Some(Role::Operator)).await);
        assert!(harness.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_route_guard_role_mismatch_redirects() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Teacher);
        harness.transport.push(json_response(200, json!({"valid": true})));
        assert!(!harness.services.auth.route_guard(Some(Role::Operator)).await);
        assert_eq!(harness.navigator.visits(), vec!["index.html"]);
    }

    #[tokio::test]
    async fn test_route_guard_invalid_token_clears_session() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Teacher);
        harness.transport.push(json_response(200, json!({"valid": false})));
        assert!(!harness.services.auth.route_guard(None).await);
        assert!(harness.session.get_token().is_none());
        assert_eq!(harness.navigator.visits(), vec!["index.html"]);
    }

    #[tokio::test]
    async fn test_validation_outage_follows_fail_open() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Teacher);
        harness.transport.push(json_response(502, json!({})));
        assert!(harness.services.auth.validate_token().await);

        let strict = TestHarness::with_config(AppConfig {
            validate_fail_open: false,
            ..AppConfig::default()
        });
        sign_in(&strict, Role::Teacher);
        assert!(!strict.services.auth.validate_token().await);
    }

    #[tokio::test]
    async fn test_validate_401_redirects_once() {
        let harness = TestHarness::new();
        sign_in(&harness, Role::Teacher);
        harness.transport.push(json_response(401, json!({})));
        assert!(!harness.services.auth.route_guard(Some(Role::Teacher)).await);
        assert_eq!(harness.navigator.visits(), vec!["index.html"]);
    }

    #[tokio::test]
    async fn test_refresh_keeps_storage_area() {
        let harness = TestHarness::new();
        harness.session.set_token("old", true);
        harness.transport.push(json_response(200, json!({"token": "new"})));
        harness.services.auth.refresh_token().await.unwrap();
        assert_eq!(harness.session.get_token().as_deref(), Some("new"));
        assert!(harness.session.is_remembered());
    }
}
