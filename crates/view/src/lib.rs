//! Mesh-config detail view.
//!
//! [`MeshConfigView`] loads one mesh config from the dashboard backend, keeps
//! its `spec` as an edit buffer and writes edits back with a GET-merge-PUT
//! against the raw document. Shared UI surfaces (action bar, notifications,
//! dialogs) are injected through [`Surfaces`].

#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use meshdash_api::{ApiError, DashboardApi};
use meshdash_core::{EndpointSet, LogLevel, MeshconfigDetail, Resource, ResourceEndpoint};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod model;
mod presenter;
mod surfaces;
mod tasks;

pub use model::{LoadState, SaveOutcome, SavePreview, ViewError};
pub use presenter::{alert_for, present_error, ALERT_WIDTH, FALLBACK_MESSAGE, INTERNAL_SERVER_ERROR_TITLE};
pub use surfaces::{AlertDialogConfig, Dialogs, Notifier, ResourceBar, RouteParams, RESOURCE_NAMESPACE_PARAM, RESOURCE_NAME_PARAM};

use model::ViewState;

/// Shared surfaces a detail view reports to.
#[derive(Clone)]
pub struct Surfaces {
    pub bar: Arc<dyn ResourceBar>,
    pub notifier: Arc<dyn Notifier>,
    pub dialogs: Arc<dyn Dialogs>,
}

pub struct MeshConfigView {
    api: Arc<dyn DashboardApi>,
    surfaces: Surfaces,
    endpoint: ResourceEndpoint,
    state: Arc<Mutex<ViewState>>,
    cancel: CancellationToken,
    load_task: Option<JoinHandle<()>>,
}

fn lock_state(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MeshConfigView {
    pub fn new(api: Arc<dyn DashboardApi>, surfaces: Surfaces) -> Self {
        Self {
            api,
            surfaces,
            endpoint: ResourceEndpoint::new(Resource::Meshconfig, true),
            state: Arc::new(Mutex::new(ViewState::default())),
            cancel: CancellationToken::new(),
            load_task: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        lock_state(&self.state)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_initialized
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().load.clone()
    }

    /// Child listing endpoints for sibling views (pods, ingress, events).
    pub fn endpoints(&self) -> EndpointSet {
        self.lock().endpoints.clone()
    }

    pub fn detail(&self) -> Option<MeshconfigDetail> {
        self.lock().meshconfig.clone()
    }

    /// Copy of the edit buffer.
    pub fn spec(&self) -> Option<serde_json::Value> {
        self.lock().meshconfig.as_ref().map(|d| d.spec.clone())
    }

    /// Mutate the edit buffer in place.
    pub fn edit_spec<F>(&self, f: F) -> Result<(), ViewError>
    where
        F: FnOnce(&mut serde_json::Value),
    {
        let mut st = self.lock();
        let detail = st.meshconfig.as_mut().ok_or(ViewError::NotInitialized)?;
        f(&mut detail.spec);
        Ok(())
    }

    pub fn log_level_options(&self) -> &'static [LogLevel] {
        LogLevel::options()
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.lock().meshconfig.as_ref().and_then(|d| meshdash_core::sidecar_log_level(&d.spec))
    }

    pub fn set_log_level(&self, level: LogLevel) -> Result<(), ViewError> {
        self.edit_spec(|spec| meshdash_core::set_sidecar_log_level(spec, level))
    }

    /// Wait for the initial fetch started by [`Self::activate`] to finish.
    pub async fn wait_loaded(&mut self) {
        let Some(task) = self.load_task.take() else { return };
        if let Err(e) = task.await {
            warn!(error = %e, "view: load task ended abnormally");
            let mut st = self.lock();
            if e.is_panic() && st.load == LoadState::Loading {
                st.load = LoadState::Failed(ApiError::Transport(format!("load task panicked: {}", e)));
            }
        }
    }

    /// Tear the view down: abandon the pending fetch and tell the action bar
    /// the detail page is gone. Repeated calls are ignored.
    pub fn destroy(&mut self) {
        {
            let mut st = self.lock();
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            self.cancel.cancel();
        }
        self.surfaces.bar.leave_detail();
        info!("view: destroyed");
    }
}

impl Drop for MeshConfigView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
