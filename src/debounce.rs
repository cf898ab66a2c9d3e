//! Input Debounce
//!
//! Each call supersedes the previous one; only the last call in a quiet
//! window actually runs.

use std::future::Future;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

pub const SEARCH_DEBOUNCE_MS: u32 = 300;

#[derive(Clone, Copy)]
pub struct Debounce {
    generation: StoredValue<u64>,
    delay_ms: u32,
}

impl Debounce {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            generation: StoredValue::new(0),
            delay_ms,
        }
    }

    pub fn run<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.generation.update_value(|g| *g += 1);
        let ticket = self.generation.get_value();
        let generation = self.generation;
        let delay_ms = self.delay_ms;
        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            if generation.try_get_value() == Some(ticket) {
                task().await;
            }
        });
    }
}
