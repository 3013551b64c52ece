use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use meshdash_core::{MeshconfigDetail, ResourceEndpoint};
use tokio::sync::Notify;

use crate::{ApiError, ApiResult, DashboardApi, HttpError};

/// A request seen by [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    GetDetail { path: String, name: String, namespace: String },
    GetRaw { url: String },
    Put { url: String, body: serde_json::Value },
}

/// Simple in-memory implementation for tests. Responses are fixed up front;
/// every request is recorded in arrival order. Queued detail responses are
/// consumed one per `get_detail` call before the fixed one is used.
pub struct MockApi {
    detail: ApiResult<MeshconfigDetail>,
    raw: ApiResult<String>,
    put: ApiResult<String>,
    detail_gate: Option<Arc<Notify>>,
    queued: Mutex<VecDeque<(ApiResult<MeshconfigDetail>, Option<Arc<Notify>>)>>,
    requests: Mutex<Vec<Recorded>>,
}

fn not_found() -> ApiError {
    ApiError::Http(HttpError::new(404, "Not Found", None))
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            detail: Err(not_found()),
            raw: Err(not_found()),
            put: Ok(String::new()),
            detail_gate: None,
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    pub fn new() -> Self { Self::default() }

    pub fn with_detail(mut self, detail: ApiResult<MeshconfigDetail>) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_raw(mut self, raw: ApiResult<String>) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_put(mut self, put: ApiResult<String>) -> Self {
        self.put = put;
        self
    }

    /// Hold `get_detail` open until the gate is notified.
    pub fn with_detail_gate(mut self, gate: Arc<Notify>) -> Self {
        self.detail_gate = Some(gate);
        self
    }

    /// Answer the next `get_detail` with `detail`, held open by `gate` if given.
    pub fn with_queued_detail(self, detail: ApiResult<MeshconfigDetail>, gate: Option<Arc<Notify>>) -> Self {
        if let Ok(mut q) = self.queued.lock() {
            q.push_back((detail, gate));
        }
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Bodies of recorded PUTs, in order.
    pub fn put_bodies(&self) -> Vec<serde_json::Value> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r { Recorded::Put { body, .. } => Some(body), _ => None })
            .collect()
    }

    fn record(&self, r: Recorded) {
        if let Ok(mut reqs) = self.requests.lock() {
            reqs.push(r);
        }
    }
}

#[async_trait::async_trait]
impl DashboardApi for MockApi {
    async fn get_detail(&self, endpoint: &str, name: &str, namespace: &str) -> ApiResult<MeshconfigDetail> {
        self.record(Recorded::GetDetail {
            path: ResourceEndpoint::resolve(endpoint, name, namespace),
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
        let next = self.queued.lock().ok().and_then(|mut q| q.pop_front());
        let (detail, gate) = next.unwrap_or_else(|| (self.detail.clone(), self.detail_gate.clone()));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        detail
    }

    async fn get_raw(&self, url: &str) -> ApiResult<String> {
        self.record(Recorded::GetRaw { url: url.to_string() });
        self.raw.clone()
    }

    async fn put_raw(&self, url: &str, body: &serde_json::Value) -> ApiResult<String> {
        self.record(Recorded::Put { url: url.to_string(), body: body.clone() });
        self.put.clone()
    }
}
