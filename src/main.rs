//! Course Ops Frontend Entry Point

mod api;
mod app;
mod auth;
mod components;
mod config;
mod context;
mod debounce;
mod error;
mod http;
mod labels;
mod list_state;
mod markdown;
mod models;
mod navigator;
mod pages;
mod pagination;
mod session;
mod storage;
mod store;
mod validation;

#[cfg(test)]
mod testing;

use app::App;
use config::AppConfig;
use context::AppServices;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_window();
    if rolling_logger::init_logger("CourseOps", config.level_filter(), config.log_capacity).is_err() {
        web_sys::console::warn_1(&"[APP] logger already initialized".into());
    }
    log::info!("[APP] api base {}", config.api_base);

    let services = AppServices::browser(config);
    mount_to_body(move || view! { <App services=services /> });
}
