#![forbid(unsafe_code)]

use std::time::Instant;

use meshdash_core::{ResourceMeta, MESHCONFIG_LABEL};
use metrics::counter;
use tracing::{info, warn};

use crate::model::LoadState;
use crate::surfaces::{RouteParams, RESOURCE_NAMESPACE_PARAM, RESOURCE_NAME_PARAM};
use crate::{lock_state, MeshConfigView};

impl MeshConfigView {
    /// Resolve the resource from `route`, derive the child endpoints and start
    /// the detail fetch. Missing parameters pass through as empty strings; the
    /// backend rejects them and the view records the failure.
    pub fn activate(&mut self, route: &RouteParams) {
        let name = route.get(RESOURCE_NAME_PARAM).unwrap_or_default().to_string();
        let namespace = route.get(RESOURCE_NAMESPACE_PARAM).unwrap_or_default().to_string();
        {
            let mut st = self.lock();
            st.endpoints = self.endpoint.children(&name, &namespace);
            if !st.is_initialized {
                st.load = LoadState::Loading;
            }
        }
        // cancel previous
        if let Some(task) = self.load_task.take() {
            task.abort();
        }

        let api = self.api.clone();
        let surfaces = self.surfaces.clone();
        let state = self.state.clone();
        let token = self.cancel.clone();
        let detail_ep = self.endpoint.detail();
        self.load_task = Some(tokio::spawn(async move {
            let t0 = Instant::now();
            counter!("meshconfig_load_total", 1u64);
            info!(name = %name, ns = %namespace, "view: load start");
            let res = tokio::select! {
                _ = token.cancelled() => {
                    info!(name = %name, "view: load cancelled");
                    return;
                }
                res = api.get_detail(&detail_ep, &name, &namespace) => res,
            };
            match res {
                Ok(detail) => {
                    let warnings = detail.errors.clone();
                    let meta = ResourceMeta::new(MESHCONFIG_LABEL, detail.object_meta.clone(), detail.type_meta.clone());
                    if !warnings.is_empty() {
                        warn!(count = warnings.len(), "view: backend reported warnings");
                    }
                    // Surfaces are notified under the lock so teardown cannot interleave.
                    let mut st = lock_state(&state);
                    if st.destroyed || token.is_cancelled() {
                        return;
                    }
                    st.meshconfig = Some(detail);
                    surfaces.notifier.push_errors(&warnings);
                    surfaces.bar.announce_resource(meta);
                    st.load = LoadState::Loaded;
                    st.is_initialized = true;
                    drop(st);
                    info!(name = %name, took_ms = %t0.elapsed().as_millis(), "view: load ok");
                }
                Err(e) => {
                    counter!("meshconfig_load_err", 1u64);
                    let mut st = lock_state(&state);
                    if st.destroyed || token.is_cancelled() {
                        return;
                    }
                    warn!(name = %name, ns = %namespace, error = %e, "view: load failed");
                    st.load = LoadState::Failed(e);
                }
            }
        }));
    }
}
