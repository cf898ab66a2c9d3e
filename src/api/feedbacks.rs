//! Feedback (Evaluation) Endpoints

use serde::Serialize;

use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::Feedback;
use crate::pagination::{parse_list, Paged};

const BASE: &str = "/api/v1/feedbacks/";

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackQuery {
    pub page: u32,
    pub size: u32,
    pub ordering: String,
    pub q: String,
    /// `YYYY-MM-DD`
    pub start: String,
    pub end: String,
    pub teacher_id: String,
    pub student_id: String,
    pub course_id: String,
    /// Exact student filter used by the student detail modal
    pub student: String,
}

impl Default for FeedbackQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 20,
            ordering: "-created_at".to_string(),
            q: String::new(),
            start: String::new(),
            end: String::new(),
            teacher_id: String::new(),
            student_id: String::new(),
            course_id: String::new(),
            student: String::new(),
        }
    }
}

impl FeedbackQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("q", &self.q)
            .push("start", &self.start)
            .push("end", &self.end)
            .push("teacher_id", &self.teacher_id)
            .push("student_id", &self.student_id)
            .push("course_id", &self.course_id)
            .push("student", &self.student)
            .push("ordering", &self.ordering);
        params
    }

    /// Drop every filter but keep size and ordering
    pub fn cleared(&self) -> Self {
        Self {
            size: self.size,
            ordering: self.ordering.clone(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct ExportArgs<'a> {
    q: &'a str,
    ordering: &'a str,
}

// ========================
// Feedback Commands
// ========================

pub async fn list_feedbacks(api: &ApiClient, query: &FeedbackQuery) -> ApiResult<Paged<Feedback>> {
    let value = api.get(BASE, query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

/// The ten newest feedbacks for one student
pub async fn recent_student_feedbacks(api: &ApiClient, student_id: &str) -> ApiResult<Vec<Feedback>> {
    let query = FeedbackQuery {
        size: 10,
        student: student_id.to_string(),
        ..FeedbackQuery::default()
    };
    Ok(list_feedbacks(api, &query).await?.items)
}

/// Queue a server-side export of the filtered feedback list
pub async fn export_feedbacks(api: &ApiClient, q: &str, ordering: &str) -> ApiResult<()> {
    let ordering = if ordering.is_empty() { "-created_at" } else { ordering };
    api.post("/api/v1/ops/feedbacks/export", &ExportArgs { q, ordering })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{json_response, TestHarness};
    use serde_json::json;

    #[test]
    fn test_params_skip_blank_filters() {
        let query = FeedbackQuery {
            q: "节奏".to_string(),
            teacher_id: "5".to_string(),
            ..FeedbackQuery::default()
        };
        assert_eq!(
            query.params().to_query_string(),
            "page=1&size=20&q=%E8%8A%82%E5%A5%8F&teacher_id=5&ordering=-created_at"
        );
    }

    #[test]
    fn test_cleared_keeps_ordering() {
        let query = FeedbackQuery {
            page: 4,
            q: "x".to_string(),
            ordering: "created_at".to_string(),
            ..FeedbackQuery::default()
        };
        let cleared = query.cleared();
        assert_eq!(cleared.page, 1);
        assert!(cleared.q.is_empty());
        assert_eq!(cleared.ordering, "created_at");
    }

    #[tokio::test]
    async fn test_items_shape_is_understood() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(
            200,
            json!({"items": [{"id": 1, "teacher_name": "李老师"}], "total": 41, "page": 2, "size": 20}),
        ));
        let query = FeedbackQuery {
            page: 2,
            ..FeedbackQuery::default()
        };
        let paged = list_feedbacks(&harness.client, &query).await.unwrap();
        assert_eq!(paged.total, 41);
        assert_eq!(paged.page, 2);
        assert_eq!(paged.state().total_pages(), 3);
        assert_eq!(paged.items[0].teacher_label(), "李老师");
    }

    #[tokio::test]
    async fn test_export_defaults_ordering() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(202, json!({})));
        export_feedbacks(&harness.client, "", "").await.unwrap();
        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.url, "/api/v1/ops/feedbacks/export");
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"q": "", "ordering": "-created_at"}));
    }
}
