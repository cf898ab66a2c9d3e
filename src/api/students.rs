//! Student Endpoints

use serde::Serialize;

use super::detail_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::{Student, StudentTag};
use crate::pagination::{parse_list, Paged};

const BASE: &str = "/api/v1/students/";

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct StudentQuery {
    pub page: u32,
    pub size: u32,
    pub search: String,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 20,
            search: String::new(),
        }
    }
}

impl StudentQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("search", &self.search);
        params
    }
}

/// Editable student fields; `tags` is omitted entirely when no tag is chosen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentPayload {
    pub nickname: String,
    pub remark_name: String,
    pub op_note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl StudentPayload {
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tags = tag.filter(|t| !t.is_empty()).map(|t| vec![t]);
        self
    }
}

#[derive(Serialize)]
struct NewStudentArgs<'a> {
    #[serde(flatten)]
    payload: &'a StudentPayload,
    xiaoetong_id: &'a str,
}

#[derive(Serialize)]
struct ExportArgs<'a> {
    q: &'a str,
}

// ========================
// Student Commands
// ========================

pub async fn list_students(api: &ApiClient, query: &StudentQuery) -> ApiResult<Paged<Student>> {
    let value = api.get(BASE, query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

pub async fn get_student(api: &ApiClient, id: &str) -> ApiResult<Student> {
    api.get_json(&detail_path(BASE, id), QueryParams::new()).await
}

/// Picker search on the ops endpoint (first 50 matches)
pub async fn search_students(api: &ApiClient, keyword: &str) -> ApiResult<Vec<Student>> {
    let query = StudentQuery {
        size: 50,
        search: keyword.trim().to_string(),
        ..StudentQuery::default()
    };
    Ok(list_students(api, &query).await?.items)
}

/// Nickname search on the legacy endpoint; a blank keyword returns nothing
pub async fn search_students_by_nickname(api: &ApiClient, keyword: &str) -> ApiResult<Vec<Student>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(Vec::new());
    }
    let params = QueryParams::new()
        .with("search", keyword)
        .with("size", 20)
        .with("ordering", "nickname");
    let value = api.get("/api/students/", params).await?;
    Ok(parse_list(value, 1, 20).items)
}

pub async fn create_student(api: &ApiClient, payload: &StudentPayload, xiaoetong_id: &str) -> ApiResult<()> {
    api.post(BASE, &NewStudentArgs { payload, xiaoetong_id }).await?;
    Ok(())
}

/// Partial update; `xiaoetong_id` is never sent on edit
pub async fn update_student(api: &ApiClient, id: &str, payload: &StudentPayload) -> ApiResult<()> {
    api.patch(&detail_path(BASE, id), payload).await?;
    Ok(())
}

pub async fn export_students(api: &ApiClient, q: &str) -> ApiResult<()> {
    api.post("/api/v1/ops/students/export", &ExportArgs { q }).await?;
    Ok(())
}

pub async fn list_student_tags(api: &ApiClient) -> ApiResult<Vec<StudentTag>> {
    let params = QueryParams::new().with("page", 1).with("size", 1000);
    let value = api.get("/api/v1/student-tags/", params).await?;
    Ok(parse_list(value, 1, 1000).items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{json_response, TestHarness};
    use serde_json::{json, Value};

    fn sample_payload() -> StudentPayload {
        StudentPayload {
            nickname: "小明".to_string(),
            remark_name: "明明".to_string(),
            op_note: String::new(),
            tags: None,
        }
    }

    #[test]
    fn test_payload_tags() {
        let body = serde_json::to_value(sample_payload().with_tag(Some(String::new()))).unwrap();
        assert!(body.get("tags").is_none());
        let body = serde_json::to_value(sample_payload().with_tag(Some("3".to_string()))).unwrap();
        assert_eq!(body["tags"], json!(["3"]));
    }

    #[tokio::test]
    async fn test_create_sends_xiaoetong_id() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(201, json!({"id": 1})));
        create_student(&harness.client, &sample_payload(), "xet_001").await.unwrap();
        let sent = harness.transport.last_request().unwrap();
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["xiaoetong_id"], "xet_001");
        assert_eq!(body["nickname"], "小明");
    }

    #[tokio::test]
    async fn test_update_is_patch_without_xiaoetong_id() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(200, json!({"id": 8})));
        update_student(&harness.client, "8", &sample_payload()).await.unwrap();
        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.url, "/api/v1/students/8/");
        assert!(!sent.body.unwrap().contains("xiaoetong_id"));
    }

    #[tokio::test]
    async fn test_blank_nickname_search_skips_request() {
        let harness = TestHarness::new();
        let found = search_students_by_nickname(&harness.client, "  ").await.unwrap();
        assert!(found.is_empty());
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_student_detail_with_object_tags() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(
            200,
            json!({"id": 8, "nickname": "小红", "tags": [{"id": 3, "name": "VIP"}], "tag_names": ["VIP"]}),
        ));
        let student = get_student(&harness.client, "8").await.unwrap();
        assert_eq!(student.first_tag().map(|t| t.as_str()), Some("3"));
        assert_eq!(student.option_label(), "小红 #8");
    }
}
