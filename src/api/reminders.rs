//! Reminder Endpoints

use serde::Serialize;

use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::Reminder;
use crate::pagination::{parse_list, Paged};

const BASE: &str = "/api/v1/reminders/";

// ========================
// Argument Structs
// ========================

/// Reminder list filters. The board variant asks for active reminders
/// addressed to the caller; the ops variant adds search filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderQuery {
    pub page: u32,
    pub size: u32,
    pub ordering: String,
    pub q: String,
    pub category: String,
    pub urgency: String,
    /// Sent as `active=true`
    pub active: bool,
    /// Sent as `include_only_active=true`
    pub include_only_active: bool,
    pub recipient_id: Option<String>,
}

impl Default for ReminderQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            ordering: "-created_at".to_string(),
            q: String::new(),
            category: String::new(),
            urgency: String::new(),
            active: false,
            include_only_active: false,
            recipient_id: None,
        }
    }
}

impl ReminderQuery {
    /// Teacher/researcher board: active reminders for me
    pub fn board() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    /// Ops list: reminders for `person_id`, active only by default
    pub fn ops(person_id: Option<String>) -> Self {
        Self {
            include_only_active: true,
            recipient_id: person_id,
            ..Self::default()
        }
    }

    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("ordering", &self.ordering)
            .push("recipient_me", true);
        if self.active {
            params.push("active", true);
        }
        params
            .push_opt("recipient_id", self.recipient_id.as_deref())
            .push("q", &self.q)
            .push("category", &self.category)
            .push("urgency", &self.urgency);
        if self.include_only_active {
            params.push("include_only_active", true);
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewReminder {
    pub category: String,
    pub urgency: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
}

#[derive(Serialize)]
struct ReadBulkArgs<'a> {
    ids: &'a [String],
}

// ========================
// Reminder Commands
// ========================

pub async fn list_reminders(api: &ApiClient, query: &ReminderQuery) -> ApiResult<Paged<Reminder>> {
    let value = api.get(BASE, query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

pub async fn create_reminder(api: &ApiClient, reminder: &NewReminder) -> ApiResult<()> {
    api.post(BASE, reminder).await?;
    Ok(())
}

/// Mark reminders read; an empty id list sends nothing
pub async fn mark_reminders_read(api: &ApiClient, ids: &[String]) -> ApiResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    api.post("/api/v1/reminders/read-bulk", &ReadBulkArgs { ids }).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{json_response, TestHarness};
    use serde_json::json;

    #[test]
    fn test_board_params() {
        let params = ReminderQuery::board().params();
        assert_eq!(
            params.to_query_string(),
            "page=1&size=10&ordering=-created_at&recipient_me=true&active=true"
        );
    }

    #[test]
    fn test_ops_params() {
        let mut query = ReminderQuery::ops(Some("12".to_string()));
        query.category = "injury".to_string();
        let params = query.params();
        assert_eq!(params.get("recipient_id"), Some("12"));
        assert_eq!(params.get("category"), Some("injury"));
        assert_eq!(params.get("include_only_active"), Some("true"));
        assert_eq!(params.get("active"), None);
        assert_eq!(params.get("q"), None);
    }

    #[test]
    fn test_new_reminder_omits_empty_optionals() {
        let body = serde_json::to_value(NewReminder {
            category: "other".to_string(),
            urgency: "normal".to_string(),
            content: "请关注".to_string(),
            ..NewReminder::default()
        })
        .unwrap();
        assert_eq!(body, json!({"category": "other", "urgency": "normal", "content": "请关注"}));
    }

    #[tokio::test]
    async fn test_nine_reminders_fit_one_page() {
        let harness = TestHarness::new();
        let rows: Vec<_> = (1..=9).map(|i| json!({"id": i, "urgency": "high"})).collect();
        harness.transport.push(json_response(200, json!({"results": rows, "count": 9})));

        let paged = list_reminders(&harness.client, &ReminderQuery::board()).await.unwrap();
        assert_eq!(paged.items.len(), 9);
        assert_eq!(paged.state().page_info(), "第 1 页 / 共 1 页（共 9 条）");
        assert!(!paged.state().has_next());
    }

    #[tokio::test]
    async fn test_mark_read_skips_empty() {
        let harness = TestHarness::new();
        mark_reminders_read(&harness.client, &[]).await.unwrap();
        assert!(harness.transport.requests().is_empty());

        harness.transport.push(json_response(200, json!({"updated": 2})));
        mark_reminders_read(&harness.client, &["1".to_string(), "2".to_string()])
            .await
            .unwrap();
        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.url, "/api/v1/reminders/read-bulk");
        assert_eq!(sent.body.as_deref(), Some(r#"{"ids":["1","2"]}"#));
    }
}
