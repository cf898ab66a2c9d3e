//! Person Endpoints

use crate::error::ApiResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::{Person, PersonRole};
use crate::pagination::parse_list;

/// Every person holding the teacher role
pub async fn list_teachers(api: &ApiClient) -> ApiResult<Vec<PersonRole>> {
    let params = QueryParams::new().with("role", "teacher").with("size", 1000);
    let value = api.get("/api/persons/roles/", params).await?;
    Ok(parse_list(value, 1, 1000).items)
}

/// First 200 persons (reminder recipients)
pub async fn list_persons(api: &ApiClient) -> ApiResult<Vec<Person>> {
    let params = QueryParams::new().with("page", 1).with("size", 200);
    let value = api.get("/api/persons/", params).await?;
    Ok(parse_list(value, 1, 200).items)
}
