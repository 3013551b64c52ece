#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use meshdash_core::{K8sError, ResourceMeta};
use meshdash_view::{AlertDialogConfig, Dialogs, Notifier, ResourceBar, Surfaces};
use tracing::{info, warn};

/// Surfaces for a terminal session: the bar and notifications log, alerts go
/// to stderr and are kept for the exit status.
#[derive(Default)]
pub struct Console {
    alerts: Mutex<Vec<AlertDialogConfig>>,
}

impl Console {
    pub fn surfaces(self: &Arc<Self>) -> Surfaces {
        Surfaces { bar: self.clone(), notifier: self.clone(), dialogs: self.clone() }
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().map(|a| a.len()).unwrap_or(0)
    }
}

impl ResourceBar for Console {
    fn announce_resource(&self, meta: ResourceMeta) {
        info!(
            kind = %meta.display_name,
            name = %meta.object_meta.name.as_deref().unwrap_or("-"),
            ns = %meta.object_meta.namespace.as_deref().unwrap_or("-"),
            "bar: resource"
        );
    }

    fn leave_detail(&self) {
        info!("bar: leave detail");
    }
}

impl Notifier for Console {
    fn push_errors(&self, errors: &[K8sError]) {
        for e in errors {
            warn!(code = e.err_status.code, reason = %e.err_status.reason, "{}", e.message());
            eprintln!("warning: {}", e.message());
        }
    }
}

impl Dialogs for Console {
    fn open_alert(&self, cfg: AlertDialogConfig) {
        eprintln!("{}: {}", cfg.title, cfg.message);
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(cfg);
        }
    }
}
