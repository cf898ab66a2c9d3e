//! Visit Record Endpoints

use serde::Serialize;

use super::detail_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::VisitRecord;
use crate::pagination::{parse_list, Paged};

const BASE: &str = "/api/v1/visit-records/";

#[derive(Debug, Clone, PartialEq)]
pub struct VisitQuery {
    pub page: u32,
    pub size: u32,
    pub ordering: String,
    pub q: String,
    pub status: String,
    pub urgency: String,
}

impl Default for VisitQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 20,
            ordering: "-created_at".to_string(),
            q: String::new(),
            status: String::new(),
            urgency: String::new(),
        }
    }
}

impl VisitQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("ordering", &self.ordering)
            .push("search", &self.q)
            .push("status", &self.status)
            .push("urgency", &self.urgency);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitPayload {
    pub student: String,
    pub urgency: Option<String>,
    pub status: String,
    pub need_follow_up: bool,
    pub content: String,
    pub result: String,
    pub next_follow_up_at: Option<String>,
    pub operator: Option<String>,
}

pub async fn list_visits(api: &ApiClient, query: &VisitQuery) -> ApiResult<Paged<VisitRecord>> {
    let value = api.get(BASE, query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

pub async fn get_visit(api: &ApiClient, id: &str) -> ApiResult<VisitRecord> {
    api.get_json(&detail_path(BASE, id), QueryParams::new()).await
}

pub async fn create_visit(api: &ApiClient, payload: &VisitPayload) -> ApiResult<()> {
    api.post(BASE, payload).await?;
    Ok(())
}

/// Full replace of an existing record
pub async fn update_visit(api: &ApiClient, id: &str, payload: &VisitPayload) -> ApiResult<()> {
    api.put(&detail_path(BASE, id), payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{json_response, TestHarness};
    use serde_json::json;

    #[test]
    fn test_search_maps_to_search_param() {
        let query = VisitQuery {
            q: "小明".to_string(),
            status: "done".to_string(),
            ..VisitQuery::default()
        };
        let params = query.params();
        assert_eq!(params.get("search"), Some("小明"));
        assert_eq!(params.get("status"), Some("done"));
        assert_eq!(params.get("urgency"), None);
    }

    #[tokio::test]
    async fn test_update_uses_put() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(200, json!({"id": 3})));
        let payload = VisitPayload {
            student: "10".to_string(),
            urgency: None,
            status: "pending".to_string(),
            need_follow_up: true,
            content: "家长反馈练习时间少".to_string(),
            result: String::new(),
            next_follow_up_at: Some("2024-03-01T02:05:00.000Z".to_string()),
            operator: Some("4".to_string()),
        };
        update_visit(&harness.client, "3", &payload).await.unwrap();
        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(sent.url, "/api/v1/visit-records/3/");
    }
}
