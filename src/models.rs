//! Frontend Models
//!
//! Data structures matching backend entities. The backend is lenient about
//! field presence and id types, so most fields are optional and ids are
//! kept as opaque strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary key as sent by the backend: integer or UUID string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Uint(u64),
            Float(f64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => EntityId(n.to_string()),
            Raw::Uint(n) => EntityId(n.to_string()),
            Raw::Float(n) => EntityId(n.to_string()),
            Raw::Text(s) => EntityId(s),
        })
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Researcher,
    Operator,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Researcher => "researcher",
            Role::Operator => "operator",
            Role::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Teacher => "教师",
            Role::Researcher => "教研",
            Role::Operator => "运营",
            Role::Unknown => "未知",
        }
    }
}

/// Profile stored next to the token after login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub person_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Login form payload
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(skip)]
    pub remember_me: bool,
}

/// Student reference: bare id or embedded object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StudentRef {
    Object {
        id: Option<EntityId>,
        #[serde(default)]
        nickname: Option<String>,
    },
    Id(EntityId),
}

impl StudentRef {
    pub fn id(&self) -> Option<&EntityId> {
        match self {
            StudentRef::Id(id) => Some(id).filter(|id| !id.is_empty()),
            StudentRef::Object { id, .. } => id.as_ref(),
        }
    }

    pub fn nickname(&self) -> Option<&str> {
        match self {
            StudentRef::Id(_) => None,
            StudentRef::Object { nickname, .. } => nickname.as_deref(),
        }
    }
}

/// Tag reference on a student: bare id or `{id, name}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Object { id: EntityId },
    Id(EntityId),
}

impl TagRef {
    pub fn id(&self) -> &EntityId {
        match self {
            TagRef::Object { id } | TagRef::Id(id) => id,
        }
    }
}

/// Piece line attached to a feedback/reminder
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PieceDetail {
    #[serde(default)]
    pub piece_name: Option<String>,
    #[serde(default)]
    pub piece: Option<serde_json::Value>,
}

impl PieceDetail {
    /// Display name; `index` is zero-based
    pub fn display_name(&self, index: usize) -> String {
        if let Some(name) = self.piece_name.as_deref().filter(|s| !s.is_empty()) {
            return name.to_string();
        }
        match &self.piece {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => format!("曲目{}", index + 1),
        }
    }
}

fn first_details<'a>(candidates: &[&'a Option<Vec<PieceDetail>>]) -> &'a [PieceDetail] {
    candidates
        .iter()
        .find_map(|c| c.as_deref())
        .unwrap_or(&[])
}

fn first_text<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|c| c.as_deref().filter(|s| !s.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Announcement {
    pub id: EntityId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub publisher: Option<EntityId>,
}

impl Announcement {
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("公告 #{}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reminder {
    pub id: EntityId,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub student: Option<StudentRef>,
    #[serde(default)]
    pub student_nickname: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub sender: Option<EntityId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub feedback_details: Option<Vec<PieceDetail>>,
    #[serde(default)]
    pub piece_details: Option<Vec<PieceDetail>>,
}

impl Reminder {
    pub fn student_label(&self) -> Option<String> {
        first_text(&[&self.student_nickname, &self.student_name])
            .map(str::to_string)
            .or_else(|| self.student.as_ref().and_then(|s| s.nickname()).map(str::to_string))
    }

    pub fn sender_label(&self) -> String {
        first_text(&[&self.sender_name])
            .map(str::to_string)
            .or_else(|| self.sender.as_ref().map(|s| s.to_string()))
            .unwrap_or_else(|| "未知发送人".to_string())
    }

    pub fn body(&self) -> Option<&str> {
        first_text(&[&self.content, &self.note])
    }

    pub fn details(&self) -> &[PieceDetail] {
        first_details(&[&self.feedback_details, &self.piece_details])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feedback {
    pub id: EntityId,
    #[serde(default)]
    pub student: Option<StudentRef>,
    #[serde(default)]
    pub student_nickname: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub teacher: Option<serde_json::Value>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default)]
    pub teacher_content: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub researcher_feedback: Option<String>,
    #[serde(default)]
    pub task_status: Option<String>,
    #[serde(default)]
    pub details: Option<Vec<PieceDetail>>,
    #[serde(default)]
    pub feedback_details: Option<Vec<PieceDetail>>,
    #[serde(default)]
    pub piece_details: Option<Vec<PieceDetail>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Feedback {
    pub fn student_label(&self) -> String {
        first_text(&[&self.student_nickname, &self.student_name])
            .map(str::to_string)
            .or_else(|| self.student.as_ref().and_then(|s| s.nickname()).map(str::to_string))
            .or_else(|| self.student.as_ref().and_then(|s| s.id()).map(|id| id.to_string()))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn teacher_label(&self) -> String {
        if let Some(name) = first_text(&[&self.teacher_name]) {
            return name.to_string();
        }
        match &self.teacher {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Object(map)) => map
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            _ => "-".to_string(),
        }
    }

    pub fn teacher_text(&self) -> Option<&str> {
        first_text(&[&self.content_text, &self.teacher_content, &self.content])
    }

    pub fn pieces(&self) -> &[PieceDetail] {
        first_details(&[&self.feedback_details, &self.piece_details, &self.details])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Student {
    pub id: EntityId,
    #[serde(default)]
    pub xiaoetong_id: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub remark_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub op_note: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub tag_names: Vec<String>,
}

impl Student {
    /// "nickname #id", or "#id" when there is no nickname
    pub fn option_label(&self) -> String {
        match self.nickname.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(nickname) => format!("{} #{}", nickname, self.id),
            None => format!("#{}", self.id),
        }
    }

    pub fn first_tag(&self) -> Option<&EntityId> {
        self.tags.first().map(TagRef::id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentTag {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvalTask {
    pub id: EntityId,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub student: Option<EntityId>,
    #[serde(default)]
    pub student_nickname: Option<String>,
    #[serde(default)]
    pub assignee: Option<EntityId>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl EvalTask {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    pub fn student_label(&self) -> String {
        first_text(&[&self.student_nickname])
            .map(str::to_string)
            .or_else(|| self.student.as_ref().map(|s| s.to_string()))
            .unwrap_or_default()
    }

    pub fn assignee_label(&self) -> String {
        first_text(&[&self.assignee_name])
            .map(str::to_string)
            .or_else(|| self.assignee.as_ref().map(|s| s.to_string()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskBatch {
    pub batch_id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub first_created_at: Option<String>,
    #[serde(default)]
    pub last_created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisitRecord {
    pub id: EntityId,
    #[serde(default)]
    pub student: Option<StudentRef>,
    #[serde(default)]
    pub student_nickname: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub need_follow_up: bool,
    #[serde(default)]
    pub next_follow_up_at: Option<String>,
    #[serde(default)]
    pub operator: Option<EntityId>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl VisitRecord {
    pub fn student_label(&self) -> Option<String> {
        first_text(&[&self.student_nickname, &self.student_name]).map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Person {
    pub id: EntityId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Person {
    pub fn option_label(&self) -> String {
        match self.username.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(username) => format!("{} #{}", username, self.id),
            None => format!("#{}", self.id),
        }
    }

    /// Case-insensitive username filter used by the recipient picker
    pub fn matches_username(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self
                .username
                .as_deref()
                .map(|u| u.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonRole {
    pub person: EntityId,
    #[serde(default)]
    pub person_name: Option<String>,
}

impl PersonRole {
    pub fn label(&self) -> String {
        self.person_name
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.person.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Course {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Piece {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let n: EntityId = serde_json::from_value(json!(42)).unwrap();
        let s: EntityId = serde_json::from_value(json!("4f1c")).unwrap();
        assert_eq!(n.as_str(), "42");
        assert_eq!(s.as_str(), "4f1c");
        assert_eq!(serde_json::to_value(&n).unwrap(), json!("42"));
    }

    #[test]
    fn test_unknown_role_does_not_fail() {
        let user: UserInfo = serde_json::from_value(json!({
            "username": "amy", "role": "admin", "person_id": 7
        }))
        .unwrap();
        assert_eq!(user.role, Role::Unknown);
        assert_eq!(user.person_id, Some(EntityId::new("7")));
    }

    #[test]
    fn test_student_ref_shapes() {
        let r: Reminder = serde_json::from_value(json!({"id": 1, "student": 9})).unwrap();
        assert_eq!(r.student.unwrap().id(), Some(&EntityId::new("9")));

        let r: Reminder = serde_json::from_value(json!({
            "id": 1, "student": {"id": "abc", "nickname": "Lily"}
        }))
        .unwrap();
        let student = r.student.clone().unwrap();
        assert_eq!(student.id(), Some(&EntityId::new("abc")));
        assert_eq!(r.student_label().as_deref(), Some("Lily"));
    }

    #[test]
    fn test_feedback_field_fallbacks() {
        let f: Feedback = serde_json::from_value(json!({
            "id": 3,
            "teacher": {"name": "王老师"},
            "teacher_content": "节奏稳定",
            "piece_details": [{"piece_name": "小步舞曲"}, {}]
        }))
        .unwrap();
        assert_eq!(f.teacher_label(), "王老师");
        assert_eq!(f.teacher_text(), Some("节奏稳定"));
        let names: Vec<String> = f.pieces().iter().enumerate().map(|(i, d)| d.display_name(i)).collect();
        assert_eq!(names, vec!["小步舞曲", "曲目2"]);
        assert_eq!(f.student_label(), "-");
    }

    #[test]
    fn test_person_username_filter() {
        let p: Person = serde_json::from_value(json!({"id": 5, "username": "OpsLead"})).unwrap();
        assert!(p.matches_username("ops"));
        assert!(p.matches_username(""));
        assert!(!p.matches_username("teacher"));
        assert_eq!(p.option_label(), "OpsLead #5");
    }
}
