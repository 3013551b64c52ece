#![forbid(unsafe_code)]

use std::time::Instant;

use meshdash_api::HttpError;
use meshdash_core::merge::{diff_summary, overlay_spec};
use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::model::{SaveOutcome, SavePreview, ViewError};
use crate::presenter::present_error;
use crate::MeshConfigView;

impl MeshConfigView {
    fn raw_url(&self) -> Result<String, ViewError> {
        let st = self.lock();
        match st.meshconfig.as_ref() {
            Some(d) if st.is_initialized => Ok(d.raw_url()),
            _ => Err(ViewError::NotInitialized),
        }
    }

    /// Fetch the stored document and overlay a deep copy of the current edit
    /// buffer onto its `spec`.
    async fn fetch_merged(&self, url: &str) -> Result<SavePreview, ViewError> {
        let text = self.api.get_raw(url).await?;
        let fetched: serde_json::Value = serde_json::from_str(&text).map_err(|e| ViewError::Parse(e.to_string()))?;
        // Buffer is read only after the fetch returns.
        let spec = self.spec().ok_or(ViewError::NotInitialized)?;
        let merged = overlay_spec(fetched.clone(), &spec).map_err(|e| ViewError::Parse(e.to_string()))?;
        let summary = diff_summary(&merged, &fetched);
        Ok(SavePreview { url: url.to_string(), fetched, merged, summary })
    }

    /// Compute what [`Self::save`] would send, without writing.
    pub async fn save_preview(&self) -> Result<SavePreview, ViewError> {
        let url = self.raw_url()?;
        self.fetch_merged(&url).await
    }

    /// Write the edit buffer back: GET the raw document, replace its `spec`,
    /// PUT the result. Not atomic: a concurrent writer's `spec` between the
    /// GET and the PUT is overwritten. Failures after the guard are presented
    /// as an alert and returned.
    pub async fn save(&self) -> Result<SaveOutcome, ViewError> {
        let url = self.raw_url()?;
        let t0 = Instant::now();
        counter!("meshconfig_save_attempts", 1u64);
        info!(url = %url, "view: save start");

        let preview = match self.fetch_merged(&url).await {
            Ok(p) => p,
            Err(e) => return Err(self.fail_save(e)),
        };
        let SavePreview { merged, summary, .. } = preview;

        let response = match self.api.put_raw(&url, &merged).await {
            Ok(text) => text,
            Err(e) => return Err(self.fail_save(ViewError::Api(e))),
        };
        let refreshed = self.refresh_spec(&response, &merged["spec"]);
        histogram!("meshconfig_save_latency_ms", t0.elapsed().as_secs_f64() * 1000.0);
        counter!("meshconfig_save_ok", 1u64);
        info!(url = %url, %summary, refreshed, took_ms = %t0.elapsed().as_millis(), "view: save ok");
        Ok(SaveOutcome { url, sent: merged, summary, refreshed })
    }

    fn fail_save(&self, err: ViewError) -> ViewError {
        counter!("meshconfig_save_err", 1u64);
        warn!(error = %err, "view: save failed");
        let http = match &err {
            ViewError::Api(e) => Some(e.to_http()),
            ViewError::Parse(msg) => Some(HttpError::new(200, "OK", Some(msg.clone()))),
            ViewError::NotInitialized => None,
        };
        present_error(self.surfaces.dialogs.as_ref(), http.as_ref());
        err
    }

    /// Adopt the server's `spec` from a PUT response, unless the buffer was
    /// edited while the write was in flight.
    fn refresh_spec(&self, response: &str, sent_spec: &serde_json::Value) -> bool {
        let Ok(doc) = serde_json::from_str::<serde_json::Value>(response) else { return false };
        let Some(server_spec) = doc.get("spec") else { return false };
        let mut st = self.lock();
        match st.meshconfig.as_mut() {
            Some(d) if &d.spec == sent_spec => {
                d.spec = server_spec.clone();
                true
            }
            _ => false,
        }
    }
}
