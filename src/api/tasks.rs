//! Evaluation Task Endpoints
//!
//! Researchers assign evaluation tasks to teachers one at a time or in
//! batches; teachers see their own tasks and submit them.

use serde::Serialize;

use super::detail_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::{EntityId, EvalTask, TaskBatch};
use crate::pagination::{parse_list, Paged};

const BASE: &str = "/api/v1/eval-tasks/";

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct EvalTaskQuery {
    pub page: u32,
    pub size: u32,
    pub ordering: String,
    pub search: String,
    pub status: String,
    pub assignee: String,
    pub batch_id: String,
}

impl Default for EvalTaskQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            ordering: "-created_at".to_string(),
            search: String::new(),
            status: String::new(),
            assignee: String::new(),
            batch_id: String::new(),
        }
    }
}

impl EvalTaskQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("ordering", &self.ordering)
            .push("search", &self.search)
            .push("status", &self.status)
            .push("assignee", &self.assignee)
            .push("batch_id", &self.batch_id);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvalTask {
    pub student: String,
    pub assignee: String,
    pub source: &'static str,
    pub note: Option<String>,
}

impl NewEvalTask {
    pub fn from_researcher(student: String, assignee: String, note: &str) -> Self {
        Self {
            student,
            assignee,
            source: "researcher",
            note: Some(note.to_string()).filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkEvalTasks {
    pub assignee: String,
    pub students: Vec<String>,
    pub note: Option<String>,
    pub batch_id: String,
}

/// Teacher-side task list
#[derive(Debug, Clone, PartialEq)]
pub struct MyTaskQuery {
    pub page: u32,
    pub size: u32,
    pub assignee: String,
    pub status: String,
}

impl MyTaskQuery {
    pub fn new(assignee: String) -> Self {
        Self {
            page: 1,
            size: 10,
            assignee,
            status: String::new(),
        }
    }

    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("page", self.page)
            .push("size", self.size)
            .push("assignee", &self.assignee)
            .push("status", &self.status);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSubmission {
    pub content: String,
    pub pieces: Vec<String>,
}

// ========================
// Eval Task Commands
// ========================

pub async fn list_eval_tasks(api: &ApiClient, query: &EvalTaskQuery) -> ApiResult<Paged<EvalTask>> {
    let value = api.get(BASE, query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

pub async fn create_eval_task(api: &ApiClient, task: &NewEvalTask) -> ApiResult<()> {
    api.post(BASE, task).await?;
    Ok(())
}

pub async fn create_eval_task_batch(api: &ApiClient, batch: &BulkEvalTasks) -> ApiResult<()> {
    api.post("/api/v1/eval-tasks/bulk/", batch).await?;
    Ok(())
}

/// Recent batches, newest first
pub async fn list_task_batches(api: &ApiClient) -> ApiResult<Vec<TaskBatch>> {
    let params = QueryParams::new().with("limit", 20);
    let value = api.get("/api/v1/eval-task-batches/", params).await?;
    Ok(parse_list(value, 1, 20).items)
}

/// `(student id, nickname)` for every task in a batch, first occurrence only
pub async fn batch_students(api: &ApiClient, batch_id: &str) -> ApiResult<Vec<(EntityId, String)>> {
    let query = EvalTaskQuery {
        size: 500,
        batch_id: batch_id.to_string(),
        ..EvalTaskQuery::default()
    };
    let params = query.params();
    let value = api.get(BASE, params).await?;
    let tasks: Paged<EvalTask> = parse_list(value, 1, 500);

    let mut students: Vec<(EntityId, String)> = Vec::new();
    for task in tasks.items {
        let Some(id) = task.student.clone().filter(|id| !id.is_empty()) else {
            continue;
        };
        if students.iter().all(|(existing, _)| *existing != id) {
            students.push((id, task.student_nickname.unwrap_or_default()));
        }
    }
    Ok(students)
}

// ========================
// Teacher Task Commands
// ========================

pub async fn list_my_tasks(api: &ApiClient, query: &MyTaskQuery) -> ApiResult<Paged<EvalTask>> {
    let value = api.get("/api/v1/tasks/", query.params()).await?;
    Ok(parse_list(value, query.page, query.size))
}

pub async fn submit_task(api: &ApiClient, task_id: &str, submission: &TaskSubmission) -> ApiResult<()> {
    let path = format!("{}submit/", detail_path("/api/v1/tasks/", task_id));
    api.post(&path, submission).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{json_response, TestHarness};
    use serde_json::{json, Value};

    #[test]
    fn test_new_task_blank_note_is_null() {
        let task = NewEvalTask::from_researcher("1".to_string(), "2".to_string(), "");
        let body = serde_json::to_value(&task).unwrap();
        assert_eq!(body, json!({"student": "1", "assignee": "2", "source": "researcher", "note": null}));
    }

    #[tokio::test]
    async fn test_batch_students_dedupes() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(
            200,
            json!({"results": [
                {"id": 1, "student": 10, "student_nickname": "甲"},
                {"id": 2, "student": 11, "student_nickname": "乙"},
                {"id": 3, "student": 10, "student_nickname": "甲"},
                {"id": 4}
            ], "count": 4}),
        ));
        let students = batch_students(&harness.client, "b-1").await.unwrap();
        assert_eq!(
            students,
            vec![(EntityId::new("10"), "甲".to_string()), (EntityId::new("11"), "乙".to_string())]
        );
        let url = harness.transport.last_request().unwrap().url;
        assert!(url.contains("batch_id=b-1"));
        assert!(url.contains("size=500"));
    }

    #[tokio::test]
    async fn test_bulk_payload() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(201, json!({"created": 2})));
        let batch = BulkEvalTasks {
            assignee: "5".to_string(),
            students: vec!["10".to_string(), "11".to_string()],
            note: None,
            batch_id: "6a1e".to_string(),
        };
        create_eval_task_batch(&harness.client, &batch).await.unwrap();
        let sent = harness.transport.last_request().unwrap();
        assert_eq!(sent.url, "/api/v1/eval-tasks/bulk/");
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["students"], json!(["10", "11"]));
        assert_eq!(body["note"], Value::Null);
    }

    #[tokio::test]
    async fn test_submit_task_path() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(200, json!({"status": "completed"})));
        let submission = TaskSubmission {
            content: "音准需加强".to_string(),
            pieces: vec!["31".to_string()],
        };
        submit_task(&harness.client, "77", &submission).await.unwrap();
        assert_eq!(harness.transport.last_request().unwrap().url, "/api/v1/tasks/77/submit/");
    }

    #[tokio::test]
    async fn test_my_tasks_filter_by_assignee() {
        let harness = TestHarness::new();
        harness.transport.push(json_response(200, json!([])));
        let mut query = MyTaskQuery::new("9".to_string());
        query.status = "pending".to_string();
        list_my_tasks(&harness.client, &query).await.unwrap();
        assert_eq!(
            harness.transport.last_request().unwrap().url,
            "/api/v1/tasks/?page=1&size=10&assignee=9&status=pending"
        );
    }
}
