//! Runtime Configuration
//!
//! Defaults can be overridden by the hosting page before the wasm bundle
//! loads:
//!
//! ```html
//! <script>
//!   window.API_BASE = "https://ops.example.com";
//!   window.APP_CONFIG = { log_level: "debug", validate_fail_open: false };
//! </script>
//! ```

use log::LevelFilter;
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub log_level: String,
    pub log_capacity: usize,
    /// Treat a failed `/auth/validate/` call as a valid session
    pub validate_fail_open: bool,
    pub login_redirect_delay_ms: u32,
    /// Page protocol, e.g. `"file:"` or `"https:"`
    #[serde(skip)]
    pub page_protocol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            log_level: "info".to_string(),
            log_capacity: 500,
            validate_fail_open: true,
            login_redirect_delay_ms: 500,
            page_protocol: "http:".to_string(),
        }
    }
}

impl AppConfig {
    /// Read overrides from `window.API_BASE` / `window.APP_CONFIG`
    pub fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let global: &wasm_bindgen::JsValue = window.as_ref();

        let mut config = js_sys::Reflect::get(global, &"APP_CONFIG".into())
            .ok()
            .filter(|v| v.is_object())
            .and_then(|v| match serde_wasm_bindgen::from_value::<AppConfig>(v) {
                Ok(config) => Some(config),
                Err(e) => {
                    web_sys::console::warn_1(&format!("[CONFIG] ignoring APP_CONFIG: {}", e).into());
                    None
                }
            })
            .unwrap_or_default();

        if let Some(base) = js_sys::Reflect::get(global, &"API_BASE".into())
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.trim().is_empty())
        {
            config.api_base = base;
        }

        if let Ok(protocol) = window.location().protocol() {
            config.page_protocol = protocol;
        }
        config
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn is_file_origin(&self) -> bool {
        self.page_protocol == "file:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"log_level": "debug", "validate_fail_open": false}"#).unwrap();
        assert_eq!(config.level_filter(), LevelFilter::Debug);
        assert!(!config.validate_fail_open);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.login_redirect_delay_ms, 500);
    }

    #[test]
    fn test_bad_level_falls_back_to_info() {
        let config = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.level_filter(), LevelFilter::Info);
        assert!(!config.is_file_origin());
    }
}
