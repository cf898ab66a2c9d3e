//! List Load State
//!
//! Every list load takes a ticket; a response is applied only if its ticket
//! is still the newest one, so a slow request can't overwrite a newer list.

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::error::ApiResult;
use crate::pagination::{PageState, Paged};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub page: PageState,
    pub status: LoadStatus,
    generation: u64,
}

impl<T> ListState<T> {
    pub fn new(size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: PageState::new(1, size),
            status: LoadStatus::Idle,
            generation: 0,
        }
    }

    /// Start a load and return its ticket
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        self.generation
    }

    /// Apply a result; returns `false` when the ticket is stale
    pub fn finish(&mut self, ticket: u64, result: ApiResult<Paged<T>>) -> bool {
        if ticket != self.generation {
            log::debug!("[LIST] dropping stale response #{} (current #{})", ticket, self.generation);
            return false;
        }
        match result {
            Ok(paged) => {
                self.page = PageState {
                    page: paged.page,
                    size: self.page.size,
                    total: paged.total,
                };
                self.items = paged.items;
                self.status = LoadStatus::Ready;
            }
            Err(e) => {
                self.items.clear();
                self.page.total = 0;
                self.status = LoadStatus::Failed(e.to_string());
            }
        }
        true
    }

    pub fn set_page(&mut self, page: u32) {
        self.page.page = page.max(1);
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Loaded successfully with nothing to show
    pub fn is_empty(&self) -> bool {
        self.status == LoadStatus::Ready && self.items.is_empty()
    }
}

/// Run `fetch` against a list signal, honoring the ticket
pub fn spawn_list_load<T, F>(state: RwSignal<ListState<T>>, fetch: F)
where
    T: Send + Sync + 'static,
    F: Future<Output = ApiResult<Paged<T>>> + 'static,
{
    let Some(ticket) = state.try_update(|s| s.begin()) else {
        return;
    };
    spawn_local(async move {
        let result = fetch.await;
        if let Err(e) = &result {
            log::error!("[LIST] load failed: {}", e);
        }
        state.try_update(|s| s.finish(ticket, result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn page_of(items: Vec<u32>, total: u64) -> Paged<u32> {
        Paged {
            items,
            total,
            page: 1,
            size: 10,
        }
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = ListState::<u32>::new(10);
        let first = state.begin();
        let second = state.begin();

        assert!(state.finish(second, Ok(page_of(vec![2], 1))));
        assert!(!state.finish(first, Ok(page_of(vec![1, 1], 2))));
        assert_eq!(state.items, vec![2]);
        assert_eq!(state.status, LoadStatus::Ready);
    }

    #[test]
    fn test_failure_empties_list_with_message() {
        let mut state = ListState::<u32>::new(10);
        let t = state.begin();
        state.finish(t, Ok(page_of(vec![1, 2], 2)));

        let t = state.begin();
        assert!(state.is_loading());
        state.finish(t, Err(ApiError::Network("offline".into())));
        assert!(state.items.is_empty());
        assert_eq!(state.page.total, 0);
        assert_eq!(state.error(), Some("网络错误: offline"));
        assert!(!state.is_empty());
    }

    #[test]
    fn test_size_is_kept_from_request() {
        let mut state = ListState::<u32>::new(20);
        state.set_page(0);
        assert_eq!(state.page.page, 1);
        let t = state.begin();
        state.finish(
            t,
            Ok(Paged {
                items: vec![],
                total: 0,
                page: 1,
                size: 0,
            }),
        );
        assert_eq!(state.page.size, 20);
        assert!(state.is_empty());
    }
}
