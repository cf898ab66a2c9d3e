//! List Responses and Paging
//!
//! Backend list endpoints answer in one of three shapes. They are all
//! folded into [`Paged`] before a page sees them.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Raw list response as sent by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Items {
        items: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        size: Option<u32>,
    },
    Drf {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
}

/// Normalized list page
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Paged<T> {
    pub fn empty(page: u32, size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            size,
        }
    }

    pub fn state(&self) -> PageState {
        PageState {
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

impl<T> ListEnvelope<T> {
    pub fn normalize(self, requested_page: u32, requested_size: u32) -> Paged<T> {
        match self {
            ListEnvelope::Bare(items) => {
                let len = items.len() as u32;
                Paged {
                    total: items.len() as u64,
                    page: 1,
                    size: if len > 0 { len } else { requested_size },
                    items,
                }
            }
            ListEnvelope::Items {
                items,
                total,
                page,
                size,
            } => Paged {
                total: total.unwrap_or(items.len() as u64),
                page: page.filter(|p| *p > 0).unwrap_or(requested_page),
                size: size.filter(|s| *s > 0).unwrap_or(requested_size),
                items,
            },
            ListEnvelope::Drf { results, count } => Paged {
                total: count.unwrap_or(results.len() as u64),
                page: requested_page,
                size: requested_size,
                items: results,
            },
        }
    }
}

/// Decode any of the three shapes; anything else is an empty page
pub fn parse_list<T: DeserializeOwned>(value: Value, page: u32, size: u32) -> Paged<T> {
    match serde_json::from_value::<ListEnvelope<T>>(value) {
        Ok(envelope) => envelope.normalize(page, size),
        Err(e) => {
            log::warn!("[LIST] unexpected list response: {}", e);
            Paged::empty(page, size)
        }
    }
}

/// Pager arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl PageState {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size, total: 0 }
    }

    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 1;
        }
        let pages = (self.total + self.size as u64 - 1) / self.size as u64;
        pages.max(1) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) * (self.size as u64) < self.total
    }

    pub fn page_info(&self) -> String {
        format!(
            "第 {} 页 / 共 {} 页（共 {} 条）",
            self.page,
            self.total_pages(),
            self.total
        )
    }

    /// Page numbers within `radius` of the current page
    pub fn page_window(&self, radius: u32) -> Vec<u32> {
        let last = self.total_pages();
        let current = self.page.clamp(1, last);
        let start = current.saturating_sub(radius).max(1);
        let end = (current + radius).min(last);
        (start..=end).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(paged: &Paged<Value>) -> Vec<i64> {
        paged.items.iter().filter_map(|v| v["id"].as_i64()).collect()
    }

    #[test]
    fn test_three_shapes_normalize_alike() {
        let rows = json!([{"id": 1}, {"id": 2}]);
        let bare = parse_list::<Value>(rows.clone(), 1, 2);
        let items = parse_list::<Value>(json!({"items": rows.clone(), "total": 2, "page": 1, "size": 2}), 1, 2);
        let drf = parse_list::<Value>(json!({"results": rows, "count": 2}), 1, 2);

        assert_eq!(bare, items);
        assert_eq!(items, drf);
        assert_eq!(ids(&bare), vec![1, 2]);
    }

    #[test]
    fn test_items_shape_fills_missing_fields() {
        let paged = parse_list::<Value>(json!({"items": [{"id": 1}], "page": 0}), 3, 20);
        assert_eq!(paged.total, 1);
        assert_eq!(paged.page, 3);
        assert_eq!(paged.size, 20);
    }

    #[test]
    fn test_empty_bare_array_keeps_requested_size() {
        let paged = parse_list::<Value>(json!([]), 1, 10);
        assert_eq!(paged.size, 10);
        assert_eq!(paged.state().total_pages(), 1);
    }

    #[test]
    fn test_unknown_shape_is_empty() {
        let paged = parse_list::<Value>(json!({"detail": "oops"}), 2, 10);
        assert_eq!(paged, Paged::empty(2, 10));
        let paged = parse_list::<Value>(Value::Null, 1, 10);
        assert!(paged.items.is_empty());
    }

    #[test]
    fn test_reminder_page_of_nine() {
        let rows: Vec<Value> = (1..=9).map(|i| json!({"id": i})).collect();
        let paged = parse_list::<Value>(json!({"results": rows, "count": 9}), 1, 10);
        let state = paged.state();
        assert_eq!(state.page_info(), "第 1 页 / 共 1 页（共 9 条）");
        assert!(!state.has_next());
        assert!(!state.has_prev());
    }

    #[test]
    fn test_pager_bounds() {
        let state = PageState { page: 2, size: 10, total: 20 };
        assert!(state.has_prev());
        assert!(!state.has_next());
        let state = PageState { page: 2, size: 10, total: 21 };
        assert!(state.has_next());
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn test_page_window() {
        let state = PageState { page: 5, size: 10, total: 100 };
        assert_eq!(state.page_window(2), vec![3, 4, 5, 6, 7]);
        let state = PageState { page: 1, size: 10, total: 25 };
        assert_eq!(state.page_window(2), vec![1, 2, 3]);
        let state = PageState { page: 1, size: 10, total: 0 };
        assert_eq!(state.page_window(2), vec![1]);
    }
}
