#![forbid(unsafe_code)]

use meshdash_api::ApiError;
use meshdash_core::{merge::DiffSummary, EndpointSet, MeshconfigDetail};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(ApiError),
}

#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub meshconfig: Option<MeshconfigDetail>,
    pub is_initialized: bool,
    pub endpoints: EndpointSet,
    pub load: LoadState,
    pub destroyed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("mesh config not loaded yet")]
    NotInitialized,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("parse: {0}")]
    Parse(String),
}

/// Merged document computed from a fresh fetch, before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePreview {
    pub url: String,
    pub fetched: serde_json::Value,
    pub merged: serde_json::Value,
    pub summary: DiffSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub url: String,
    /// Document sent in the PUT.
    pub sent: serde_json::Value,
    pub summary: DiffSummary,
    /// Whether the in-memory spec was replaced by the server's copy.
    pub refreshed: bool,
}
