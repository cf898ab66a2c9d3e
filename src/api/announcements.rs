//! Announcement Endpoints

use serde::Serialize;

use super::detail_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::Announcement;
use crate::pagination::{parse_list, Paged};

const BASE: &str = "/api/v1/announcements/";

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementQuery {
    pub page: u32,
    pub size: u32,
    pub ordering: String,
}

impl Default for AnnouncementQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            ordering: "-created_at".to_string(),
        }
    }
}

impl AnnouncementQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("ordering", &self.ordering);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnouncementPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub start_at: String,
    pub end_at: Option<String>,
    pub publisher: Option<String>,
}

// ========================
// Announcement Commands
// ========================

pub async fn list_announcements(api: &ApiClient, query: &AnnouncementQuery) -> ApiResult<Paged<Announcement>> {
    let value = api.get(BASE, query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

pub async fn create_announcement(api: &ApiClient, payload: &AnnouncementPayload) -> ApiResult<()> {
    api.post(BASE, payload).await?;
    Ok(())
}

pub async fn update_announcement(api: &ApiClient, id: &str, payload: &AnnouncementPayload) -> ApiResult<()> {
    api.patch(&detail_path(BASE, id), payload).await?;
    Ok(())
}

pub async fn delete_announcement(api: &ApiClient, id: &str) -> ApiResult<()> {
    api.delete(&detail_path(BASE, id)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{json_response, TestHarness};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_uses_query() {
        let harness = TestHarness::new();
        harness
            .transport
            .push(json_response(200, json!({"results": [{"id": 1, "title": "停课"}], "count": 11})));
        let paged = list_announcements(&harness.client, &AnnouncementQuery::default())
            .await
            .unwrap();
        assert_eq!(paged.total, 11);
        assert_eq!(paged.items[0].display_title(), "停课");
        assert_eq!(
            harness.transport.requests()[0].url,
            "/api/v1/announcements/?page=1&size=10&ordering=-created_at"
        );
    }

    #[tokio::test]
    async fn test_update_patches_detail() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(200, json!({"id": 4})));
        let payload = AnnouncementPayload {
            kind: "injury_notice".to_string(),
            content: "小明手腕受伤".to_string(),
            start_at: "2024-03-01T02:00:00.000Z".to_string(),
            end_at: None,
            publisher: Some("7".to_string()),
        };
        update_announcement(&harness.client, "4", &payload).await.unwrap();

        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.url, "/api/v1/announcements/4/");
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["type"], "injury_notice");
        assert_eq!(body["end_at"], serde_json::Value::Null);
    }
}
