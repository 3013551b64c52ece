//! Meshdash dashboard API façade.
//!
//! Views depend on the [`DashboardApi`] trait only. [`HttpApi`] talks to a
//! running dashboard backend; [`MockApi`] is an in-memory stand-in for tests.

#![forbid(unsafe_code)]

use meshdash_core::MeshconfigDetail;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod http;
pub mod mock;
pub mod prom;

pub use config::ClientConfig;
pub use http::HttpApi;
pub use mock::{MockApi, Recorded};

/// Error response of an HTTP exchange, in the shape dialogs render it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpError {
    pub status: u16,
    pub status_text: String,
    /// Response body, if the server sent one.
    pub payload: Option<String>,
}

impl HttpError {
    pub fn new(status: u16, status_text: impl Into<String>, payload: Option<String>) -> Self {
        Self { status, status_text: status_text.into(), payload }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status, self.status_text)?;
        if let Some(p) = self.payload.as_deref().filter(|p| !p.is_empty()) {
            write!(f, ": {}", p)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Server answered with a non-success status.
    #[error("http: {0}")]
    Http(HttpError),
    /// Request never produced a response (connect, timeout, TLS).
    #[error("transport: {0}")]
    Transport(String),
    /// Response arrived but could not be decoded.
    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// View of this error as an HTTP error response. Transport failures map to
    /// status 0 / "Unknown Error"; decode failures keep the "OK" status they
    /// were received with.
    pub fn to_http(&self) -> HttpError {
        match self {
            ApiError::Http(e) => e.clone(),
            ApiError::Transport(msg) => HttpError::new(0, "Unknown Error", Some(msg.clone())),
            ApiError::Decode(msg) => HttpError::new(200, "OK", Some(msg.clone())),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend operations the mesh-config detail view needs.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// Fetch a detail representation. `endpoint` is a detail template with
    /// `:namespace`/`:name` placeholders.
    async fn get_detail(&self, endpoint: &str, name: &str, namespace: &str) -> ApiResult<MeshconfigDetail>;

    /// GET `url` with `Accept: application/json`, returning the body as text.
    async fn get_raw(&self, url: &str) -> ApiResult<String>;

    /// PUT `body` to `url` with `Content-Type: application/json`, returning
    /// the response body as text.
    async fn put_raw(&self, url: &str, body: &serde_json::Value) -> ApiResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_maps_to_unknown_status() {
        let e = ApiError::Transport("connection refused".into()).to_http();
        assert_eq!(e.status, 0);
        assert_eq!(e.status_text, "Unknown Error");
        assert_eq!(e.payload.as_deref(), Some("connection refused"));
    }

    #[test]
    fn http_error_display_includes_payload() {
        let e = HttpError::new(403, "Forbidden", Some("quota exceeded".into()));
        assert_eq!(e.to_string(), "403 Forbidden: quota exceeded");
        assert_eq!(HttpError::new(500, "Internal Server Error", Some(String::new())).to_string(), "500 Internal Server Error");
    }
}
