use std::time::Instant;

use meshdash_core::{MeshconfigDetail, ResourceEndpoint};
use metrics::{counter, histogram};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, warn};

use crate::{ApiError, ApiResult, ClientConfig, DashboardApi, HttpError};

/// Reason phrase for `status`; codes without a standard phrase get "Unknown Error".
pub(crate) fn status_text(status: reqwest::StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Error")
}

/// [`DashboardApi`] over HTTP via `reqwest`.
pub struct HttpApi {
    cfg: ClientConfig,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(cfg: ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.cfg.join(path);
        let mut rb = self.client.request(method, url).header(ACCEPT, "application/json");
        if let Some(token) = self.cfg.token.as_deref() {
            rb = rb.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        rb
    }

    async fn send_text(&self, rb: reqwest::RequestBuilder, op: &'static str) -> ApiResult<String> {
        let t0 = Instant::now();
        counter!("dashboard_http_requests", 1u64);
        let resp = rb.send().await.map_err(|e| {
            counter!("dashboard_http_transport_err", 1u64);
            warn!(op, error = %e, "api: transport failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        histogram!("dashboard_http_latency_ms", t0.elapsed().as_secs_f64() * 1000.0);
        if !status.is_success() {
            counter!("dashboard_http_status_err", 1u64);
            info!(op, status = status.as_u16(), took_ms = %t0.elapsed().as_millis(), "api: request rejected");
            let payload = if body.is_empty() { None } else { Some(body) };
            return Err(ApiError::Http(HttpError::new(
                status.as_u16(),
                status_text(status),
                payload,
            )));
        }
        debug!(op, bytes = body.len(), took_ms = %t0.elapsed().as_millis(), "api: request ok");
        Ok(body)
    }
}

#[async_trait::async_trait]
impl DashboardApi for HttpApi {
    async fn get_detail(&self, endpoint: &str, name: &str, namespace: &str) -> ApiResult<MeshconfigDetail> {
        let path = ResourceEndpoint::resolve(endpoint, name, namespace);
        info!(path = %path, "api: get_detail start");
        let text = self.send_text(self.request(reqwest::Method::GET, &path), "get_detail").await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_raw(&self, url: &str) -> ApiResult<String> {
        info!(url = %url, "api: get_raw start");
        self.send_text(self.request(reqwest::Method::GET, url), "get_raw").await
    }

    async fn put_raw(&self, url: &str, body: &serde_json::Value) -> ApiResult<String> {
        info!(url = %url, "api: put_raw start");
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let rb = self.request(reqwest::Method::PUT, url).header(CONTENT_TYPE, "application/json").body(bytes);
        self.send_text(rb, "put_raw").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_never_blank() {
        assert_eq!(status_text(reqwest::StatusCode::FORBIDDEN), "Forbidden");
        let custom = reqwest::StatusCode::from_u16(599).expect("status");
        assert_eq!(status_text(custom), "Unknown Error");
    }
}
