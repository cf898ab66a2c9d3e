//! HTTP Client
//!
//! Every backend call goes through [`ApiClient`]: URL resolution, query
//! strings, auth header, JSON bodies, response parsing and the global
//! 401 handling. The actual fetch is behind [`HttpTransport`] so the
//! client can be driven by a scripted transport in tests.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::navigator::{Navigator, Route};
use crate::session::SessionStore;

// ========================
// Wire Types
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false)
    }
}

#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

/// `fetch` via gloo-net
pub struct FetchTransport;

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        use gloo_net::http::Request;

        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Put => Request::put(&request.url),
            HttpMethod::Patch => Request::patch(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Encode(e.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let content_type = response.headers().get("content-type");
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

// ========================
// Query / URL Helpers
// ========================

/// `application/x-www-form-urlencoded` byte set (space handled separately)
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// `encodeURIComponent` byte set
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn form_encode(s: &str) -> String {
    utf8_percent_encode(s, FORM).to_string().replace("%20", "+")
}

/// Encode one path segment (ids interpolated into REST paths)
pub fn encode_segment(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Ordered query parameters; empty values are never added
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Absolute URLs pass through; on a `file:` page the API base is prefixed
pub fn resolve_url(api_base: &str, file_origin: bool, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if file_origin && !api_base.is_empty() {
        let base = api_base.strip_suffix('/').unwrap_or(api_base);
        let sep = if path.starts_with('/') { "" } else { "/" };
        return format!("{}{}{}", base, sep, path);
    }
    path.to_string()
}

pub fn append_query(url: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, sep, params.to_query_string())
}

/// `Token <t>` unless the stored value already carries a scheme
pub fn authorization_value(token: &str) -> String {
    if token.starts_with("Bearer ") || token.starts_with("Token ") {
        token.to_string()
    } else {
        format!("Token {}", token)
    }
}

// ========================
// Api Client
// ========================

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
}

impl RequestBody {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> ApiResult<Self> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Encode(e.to_string()))
    }

    fn into_string(self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
        }
    }
}

/// One request as a page describes it, before URL/auth resolution
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<RequestBody>,
    /// Report 401 as a plain HTTP error instead of logging the user out
    pub allow_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
            allow_unauthorized: false,
        }
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn allow_unauthorized(mut self) -> Self {
        self.allow_unauthorized = true;
        self
    }
}

pub struct ApiClient {
    transport: Rc<dyn HttpTransport>,
    session: SessionStore,
    navigator: Rc<dyn Navigator>,
    config: Rc<AppConfig>,
    login_redirect_sent: Cell<bool>,
}

impl ApiClient {
    pub fn new(
        transport: Rc<dyn HttpTransport>,
        session: SessionStore,
        navigator: Rc<dyn Navigator>,
        config: Rc<AppConfig>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            config,
            login_redirect_sent: Cell::new(false),
        }
    }

    /// Whether a 401 already sent the user back to login
    pub fn redirected_to_login(&self) -> bool {
        self.login_redirect_sent.get()
    }

    pub fn url_for(&self, path: &str, params: &QueryParams) -> String {
        let url = resolve_url(&self.config.api_base, self.config.is_file_origin(), path);
        append_query(&url, params)
    }

    fn build(&self, request: ApiRequest) -> HttpRequest {
        let url = self.url_for(&request.path, &request.params);
        let mut headers = Vec::new();
        if request.body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.session.get_token() {
            headers.push(("Authorization".to_string(), authorization_value(&token)));
        }
        HttpRequest {
            method: request.method,
            url,
            headers,
            body: request.body.map(RequestBody::into_string),
        }
    }

    /// Clear credentials and send the user to login; only the first 401
    /// triggers the redirect.
    fn handle_unauthorized(&self) {
        self.session.clear();
        if !self.login_redirect_sent.replace(true) {
            log::warn!("[HTTP] 401 received, redirecting to login");
            self.navigator.go(Route::Login);
        }
    }

    pub async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let allow_unauthorized = request.allow_unauthorized;
        let http_request = self.build(request);
        log::debug!("[HTTP] {} {}", http_request.method.as_str(), http_request.url);

        let response = match self.transport.send(http_request).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("[HTTP] request failed: {}", e);
                return Err(e);
            }
        };

        if response.status == 401 && !allow_unauthorized {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        let data = parse_body(&response);
        if !response.is_success() {
            let err = ApiError::from_status(response.status, data.unwrap_or(Value::Null));
            log::warn!("[HTTP] {} -> {}", response.status, err);
            return Err(err);
        }
        data
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        params: QueryParams,
        body: Option<RequestBody>,
    ) -> ApiResult<Value> {
        let mut request = ApiRequest::new(method, path).params(params);
        request.body = body;
        self.send(request).await
    }

    pub async fn get(&self, path: &str, params: QueryParams) -> ApiResult<Value> {
        self.request(HttpMethod::Get, path, params, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = RequestBody::json(body)?;
        self.request(HttpMethod::Post, path, QueryParams::new(), Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = RequestBody::json(body)?;
        self.request(HttpMethod::Put, path, QueryParams::new(), Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = RequestBody::json(body)?;
        self.request(HttpMethod::Patch, path, QueryParams::new(), Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(HttpMethod::Delete, path, QueryParams::new(), None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, params: QueryParams) -> ApiResult<T> {
        let value = self.get(path, params).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// JSON (empty ⇒ `null`) when the content type says so, otherwise text
fn parse_body(response: &HttpResponse) -> ApiResult<Value> {
    if !response.is_json() {
        return Ok(Value::String(response.body.clone()));
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{json_response, text_response, TestHarness};
    use serde_json::json;

    #[test]
    fn test_resolve_url() {
        let base = "http://127.0.0.1:8000/";
        assert_eq!(resolve_url(base, true, "/api/x/"), "http://127.0.0.1:8000/api/x/");
        assert_eq!(resolve_url(base, true, "api/x/"), "http://127.0.0.1:8000/api/x/");
        assert_eq!(resolve_url(base, false, "/api/x/"), "/api/x/");
        assert_eq!(resolve_url("", true, "/api/x/"), "/api/x/");
        assert_eq!(resolve_url(base, true, "https://other/x"), "https://other/x");
    }

    #[test]
    fn test_query_skips_empty_and_encodes() {
        let mut params = QueryParams::new();
        params.push("q", "小 明").push("status", "").push("page", 2);
        params.push_opt::<String>("teacher_id", None);
        assert_eq!(params.to_query_string(), "q=%E5%B0%8F+%E6%98%8E&page=2");
        assert_eq!(append_query("/a/?x=1", &params), "/a/?x=1&q=%E5%B0%8F+%E6%98%8E&page=2");
        assert_eq!(append_query("/a/", &QueryParams::new()), "/a/");
    }

    #[test]
    fn test_authorization_value() {
        assert_eq!(authorization_value("abc"), "Token abc");
        assert_eq!(authorization_value("Bearer xyz"), "Bearer xyz");
        assert_eq!(authorization_value("Token abc"), "Token abc");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_segment("42"), "42");
    }

    #[tokio::test]
    async fn test_request_headers_and_body() {
        let harness = TestHarness::new();
        harness.session.set_token("tok", false);
        harness.transport.push(json_response(201, json!({"id": 1})));

        let result = harness.client.post("/api/v1/reminders/", &json!({"content": "hi"})).await;
        assert_eq!(result, Ok(json!({"id": 1})));

        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].header("authorization"), Some("Token tok"));
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"content":"hi"}"#));
    }

    #[tokio::test]
    async fn test_get_without_body_has_no_content_type() {
        let harness = TestHarness::new();
        harness.transport.push(text_response(200, "pong"));
        let result = harness.client.get("/ping", QueryParams::new()).await;
        assert_eq!(result, Ok(Value::String("pong".into())));
        let sent = harness.transport.requests();
        assert_eq!(sent[0].header("content-type"), None);
        assert_eq!(sent[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_file_origin_prefixes_api_base() {
        let harness = TestHarness::with_config(AppConfig {
            page_protocol: "file:".to_string(),
            ..AppConfig::default()
        });
        harness.transport.push(json_response(200, json!([])));
        let params = QueryParams::new().with("page", 1);
        harness.client.get("/api/v1/students/", params).await.unwrap();
        assert_eq!(
            harness.transport.requests()[0].url,
            "http://127.0.0.1:8000/api/v1/students/?page=1"
        );
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let harness = TestHarness::new();
        harness
            .transport
            .push(json_response(400, json!({"detail": "学员不存在"})));
        let err = harness.client.delete("/api/v1/students/9/").await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "学员不存在");
    }

    #[tokio::test]
    async fn test_empty_json_body_is_null() {
        let harness = TestHarness::new();
        harness.transport.push(HttpResponse {
            status: 204,
            content_type: Some("application/json".to_string()),
            body: String::new(),
        });
        let result = harness.client.delete("/api/v1/announcements/3/").await;
        assert_eq!(result, Ok(Value::Null));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_and_redirects_once() {
        let harness = TestHarness::new();
        harness.session.set_token("stale", true);
        harness.transport.push(json_response(401, json!({"detail": "expired"})));
        harness.transport.push(json_response(401, json!({"detail": "expired"})));

        let first = harness.client.get("/api/v1/reminders/", QueryParams::new()).await;
        let second = harness.client.get("/api/v1/feedbacks/", QueryParams::new()).await;

        assert_eq!(first, Err(ApiError::Unauthorized));
        assert_eq!(second, Err(ApiError::Unauthorized));
        assert_eq!(first.unwrap_err().to_string(), "未授权或登录已过期");
        assert!(harness.session.get_token().is_none());
        assert_eq!(harness.navigator.visits(), vec!["index.html"]);
    }

    #[tokio::test]
    async fn test_allow_unauthorized_reports_plain_error() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(401, json!({"detail": "密码错误"})));
        let request = ApiRequest::new(HttpMethod::Post, "/auth/login/").allow_unauthorized();
        let err = harness.client.send(request).await.unwrap_err();
        assert_eq!(err.to_string(), "密码错误");
        assert!(harness.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let harness = TestHarness::new();
        let err = harness.client.get("/x", QueryParams::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
