//! API Errors
//!
//! Everything that can go wrong between a page and the backend.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// fetch itself rejected (offline, CORS, DNS...)
    #[error("网络错误: {0}")]
    Network(String),

    /// Non-2xx response other than 401
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Value,
    },

    /// 401: credentials were cleared and a redirect to login is under way
    #[error("未授权或登录已过期")]
    Unauthorized,

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("请求编码失败: {0}")]
    Encode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build an HTTP error, picking the message from `detail`, then `message`
    pub fn from_status(status: u16, body: Value) -> Self {
        let message = ["detail", "message"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        ApiError::Http { status, message, body }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_prefers_detail() {
        let err = ApiError::from_status(400, json!({"detail": "bad", "message": "other"}));
        assert_eq!(err.to_string(), "bad");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_message_falls_back_to_status() {
        let err = ApiError::from_status(500, Value::String("<html>".into()));
        assert_eq!(err.to_string(), "HTTP 500");
        let err = ApiError::from_status(404, json!({"message": "missing"}));
        assert_eq!(err.to_string(), "missing");
        assert!(err.is_not_found());
    }
}
