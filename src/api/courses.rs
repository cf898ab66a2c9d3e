//! Course Endpoints

use super::detail_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::{Course, Piece};
use crate::pagination::parse_list;

/// Enabled courses sorted by name
pub async fn list_courses(api: &ApiClient) -> ApiResult<Vec<Course>> {
    let params = QueryParams::new()
        .with("status", "enabled")
        .with("size", 1000)
        .with("ordering", "name");
    let value = api.get("/api/courses/", params).await?;
    Ok(parse_list(value, 1, 1000).items)
}

pub async fn list_course_pieces(api: &ApiClient, course_id: &str) -> ApiResult<Vec<Piece>> {
    let path = format!("{}pieces/", detail_path("/api/courses/", course_id));
    let value = api.get(&path, QueryParams::new()).await?;
    Ok(parse_list(value, 1, 1000).items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{json_response, TestHarness};
    use serde_json::json;

    #[tokio::test]
    async fn test_pieces_of_course() {
        let harness = TestHarness::new();
        harness
            .transport
            .push(json_response(200, json!([{"id": 1, "name": "小星星"}, {"id": 2, "name": "欢乐颂"}])));
        let pieces = list_course_pieces(&harness.client, "12").await.unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[1].name, "欢乐颂");
        assert_eq!(harness.transport.last_request().unwrap().url, "/api/courses/12/pieces/");
    }
}
