//! Prometheus instant-query proxy used by the mesh dashboards.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ApiError, ApiResult, HttpError};

const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromMetric {
    #[serde(default)]
    pub node_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromSample {
    #[serde(default)]
    pub metric: PromMetric,
    /// `[unix_ts, "value"]` as Prometheus encodes it.
    #[serde(default)]
    pub value: Vec<serde_json::Value>,
}

impl PromSample {
    pub fn timestamp(&self) -> Option<f64> {
        self.value.first().and_then(|v| v.as_f64())
    }

    pub fn scalar(&self) -> Option<f64> {
        self.value.get(1).and_then(|v| v.as_str()).and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    #[serde(default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<PromSample>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryInfo {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: QueryData,
}

impl QueryInfo {
    pub fn parse(text: &str) -> ApiResult<Self> {
        serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// `{endpoint}/api/v1/query?query=...` with the query form-encoded.
pub fn query_url(endpoint: &str, query: &str) -> ApiResult<reqwest::Url> {
    let base = format!("{}/api/v1/query", endpoint.trim_end_matches('/'));
    reqwest::Url::parse_with_params(&base, &[("query", query)]).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Run an instant query against the Prometheus at `endpoint`.
pub async fn query_metric(endpoint: &str, query: &str) -> ApiResult<QueryInfo> {
    let t0 = Instant::now();
    let url = query_url(endpoint, query)?;
    info!(url = %url, "prom: query start");
    let client = reqwest::Client::builder()
        .timeout(QUERY_TIMEOUT)
        .build()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let resp = client.get(url).send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = resp.status();
    let body = resp.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;
    if !status.is_success() {
        warn!(status = status.as_u16(), "prom: query rejected");
        return Err(ApiError::Http(HttpError::new(
            status.as_u16(),
            crate::http::status_text(status),
            Some(body),
        )));
    }
    let info = QueryInfo::parse(&body)?;
    info!(status = %info.status, samples = info.data.result.len(), took_ms = %t0.elapsed().as_millis(), "prom: query ok");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_encodes_query() {
        let url = query_url("http://prom:7070/", "node_load1 > 0").expect("url");
        assert_eq!(url.as_str(), "http://prom:7070/api/v1/query?query=node_load1+%3E+0");
    }

    #[test]
    fn parses_vector_result() {
        let text = r#"{
            "status": "success",
            "data": {
                "resultType": "vector",
                "result": [
                    { "metric": { "node_name": "node-a" }, "value": [1700000000.5, "0.25"] }
                ]
            }
        }"#;
        let info = QueryInfo::parse(text).expect("parse");
        assert_eq!(info.status, "success");
        assert_eq!(info.data.result_type, "vector");
        let s = &info.data.result[0];
        assert_eq!(s.metric.node_name, "node-a");
        assert_eq!(s.timestamp(), Some(1700000000.5));
        assert_eq!(s.scalar(), Some(0.25));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        assert!(matches!(QueryInfo::parse("<html>"), Err(ApiError::Decode(_))));
    }
}
