//! Display Labels
//!
//! Backend enum values → Chinese labels and badge classes, plus the date
//! formatting shared by all list views.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// `(text, badge class)`
pub type Badge = (&'static str, &'static str);

// ========================
// Urgency
// ========================

/// Teacher board scale
pub fn board_urgency(value: Option<&str>) -> Badge {
    match value.unwrap_or_default() {
        "high" | "urgent" => ("高", "badge-danger"),
        "medium" => ("中", "badge-warning"),
        "low" => ("低", "badge-info"),
        _ => ("一般", "badge-secondary"),
    }
}

/// Ops scale (`urgent` / `normal`)
pub fn ops_urgency(value: Option<&str>) -> Badge {
    match value.unwrap_or_default().to_lowercase().as_str() {
        "urgent" => ("紧急", "badge-danger"),
        "normal" => ("一般", "badge-warning"),
        _ => ("未设", "badge-secondary"),
    }
}

pub const OPS_URGENCY_OPTIONS: &[(&str, &str)] = &[("normal", "一般"), ("urgent", "紧急")];

pub const VISIT_URGENCY_OPTIONS: &[(&str, &str)] = &[("high", "高"), ("medium", "中"), ("low", "低")];

// ========================
// Categories
// ========================

pub fn board_category(value: Option<&str>) -> String {
    let key = value.unwrap_or_default();
    match key {
        "performance_poor" => "教学效果差",
        "attitude_problem" => "态度问题",
        "irregular_return" => "回课不规律",
        "injury" => "有伤病",
        "live_suggestion" => "直播建议",
        "other" => "其他",
        "" => "-",
        other => return other.to_string(),
    }
    .to_string()
}

pub fn ops_category(value: Option<&str>) -> String {
    let key = value.unwrap_or_default().to_lowercase();
    match key.as_str() {
        "poor_effect" => "教学效果差".to_string(),
        "attitude" => "学员态度问题".to_string(),
        "injury" => "有伤病".to_string(),
        "other" => "其他".to_string(),
        "" => "-".to_string(),
        _ => key.clone(),
    }
}

pub const OPS_CATEGORY_OPTIONS: &[(&str, &str)] = &[
    ("other", "其他"),
    ("poor_effect", "教学效果差"),
    ("attitude", "态度问题"),
    ("injury", "有伤病"),
];

// ========================
// Announcements / Tasks / Visits
// ========================

pub const ANNOUNCEMENT_TYPES: &[(&str, &str)] = &[
    ("injury_notice", "学员伤病"),
    ("teaching_reminder", "教学提醒"),
];

pub fn announcement_type(value: Option<&str>) -> &'static str {
    ANNOUNCEMENT_TYPES
        .iter()
        .find(|(k, _)| Some(*k) == value)
        .map(|(_, v)| *v)
        .unwrap_or("公告")
}

pub fn task_status(value: Option<&str>) -> Badge {
    match value {
        Some("completed") => ("已完成", "badge-success"),
        _ => ("未完成", "badge-warning"),
    }
}

pub fn task_source(value: Option<&str>) -> &'static str {
    match value {
        Some("teacher") => "教师",
        _ => "教研",
    }
}

pub const VISIT_STATUS_OPTIONS: &[(&str, &str)] = &[
    ("pending", "未处理"),
    ("done", "已处理"),
    ("closed", "已关闭"),
];

pub fn visit_status(value: Option<&str>) -> String {
    match value {
        None | Some("") => "-".to_string(),
        Some(v) => VISIT_STATUS_OPTIONS
            .iter()
            .find(|(k, _)| *k == v)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| v.to_string()),
    }
}

// ========================
// Dates
// ========================

fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `YYYY-MM-DD HH:MM` in `tz`; unparseable input comes back unchanged
pub fn format_minutes_in<Tz: TimeZone>(raw: Option<&str>, tz: &Tz) -> String {
    match raw.filter(|s| !s.is_empty()) {
        None => String::new(),
        Some(raw) => parse_in(raw, tz)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// `YYYY-MM-DD HH:MM:SS` in `tz`, `-` when missing
pub fn format_seconds_in<Tz: TimeZone>(raw: Option<&str>, tz: &Tz) -> String {
    match raw.filter(|s| !s.is_empty()) {
        None => "-".to_string(),
        Some(raw) => parse_in(raw, tz)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

pub fn format_minutes(raw: Option<&str>) -> String {
    format_minutes_in(raw, &Local)
}

pub fn format_seconds(raw: Option<&str>) -> String {
    format_seconds_in(raw, &Local)
}

/// Backend timestamp → `<input type="datetime-local">` value
pub fn to_datetime_local_in<Tz: TimeZone>(raw: Option<&str>, tz: &Tz) -> String {
    raw.and_then(|r| parse_in(r, tz))
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

pub fn to_datetime_local(raw: Option<&str>) -> String {
    to_datetime_local_in(raw, &Local)
}

/// `datetime-local` value (wall clock in `tz`) → UTC ISO-8601 with millis
pub fn from_datetime_local_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    let local = tz.from_local_datetime(&naive).earliest()?;
    Some(local.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn from_datetime_local(value: &str) -> Option<String> {
    from_datetime_local_in(value, &Local)
}

pub fn now_datetime_local() -> String {
    Local::now().format("%Y-%m-%dT%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn shanghai() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_format_converts_to_zone() {
        let tz = shanghai();
        assert_eq!(format_minutes_in(Some("2024-03-01T02:05:09Z"), &tz), "2024-03-01 10:05");
        assert_eq!(format_seconds_in(Some("2024-03-01T02:05:09.123+00:00"), &tz), "2024-03-01 10:05:09");
    }

    #[test]
    fn test_format_missing_and_garbage() {
        let tz = shanghai();
        assert_eq!(format_minutes_in(None, &tz), "");
        assert_eq!(format_seconds_in(Some(""), &tz), "-");
        assert_eq!(format_seconds_in(Some("soon"), &tz), "soon");
    }

    #[test]
    fn test_datetime_local_roundtrip() {
        let tz = shanghai();
        assert_eq!(to_datetime_local_in(Some("2024-03-01T02:05:00Z"), &tz), "2024-03-01T10:05");
        assert_eq!(
            from_datetime_local_in("2024-03-01T10:05", &tz).as_deref(),
            Some("2024-03-01T02:05:00.000Z")
        );
        assert_eq!(from_datetime_local_in("", &tz), None);
    }

    #[test]
    fn test_label_maps() {
        assert_eq!(board_urgency(Some("urgent")), ("高", "badge-danger"));
        assert_eq!(board_urgency(None), ("一般", "badge-secondary"));
        assert_eq!(ops_urgency(Some("NORMAL")), ("一般", "badge-warning"));
        assert_eq!(ops_urgency(Some("high")), ("未设", "badge-secondary"));
        assert_eq!(board_category(Some("live_suggestion")), "直播建议");
        assert_eq!(board_category(Some("custom")), "custom");
        assert_eq!(ops_category(Some("attitude")), "学员态度问题");
        assert_eq!(ops_category(None), "-");
        assert_eq!(task_status(Some("completed")).0, "已完成");
        assert_eq!(task_source(Some("researcher")), "教研");
        assert_eq!(visit_status(Some("done")), "已处理");
        assert_eq!(announcement_type(Some("injury_notice")), "学员伤病");
    }
}
