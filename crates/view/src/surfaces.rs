#![forbid(unsafe_code)]

use std::collections::HashMap;

use meshdash_core::{K8sError, ResourceMeta};
use serde::{Deserialize, Serialize};

pub const RESOURCE_NAME_PARAM: &str = "resourceName";
pub const RESOURCE_NAMESPACE_PARAM: &str = "resourceNamespace";

/// Snapshot of the navigation parameters the view was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub fn new() -> Self { Self::default() }

    pub fn for_resource(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.insert(RESOURCE_NAME_PARAM, name);
        p.insert(RESOURCE_NAMESPACE_PARAM, namespace);
        p
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Shared title/breadcrumb bar.
pub trait ResourceBar: Send + Sync {
    fn announce_resource(&self, meta: ResourceMeta);
    fn leave_detail(&self);
}

/// Shared notification surface.
pub trait Notifier: Send + Sync {
    fn push_errors(&self, errors: &[K8sError]);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertDialogConfig {
    pub width: String,
    pub title: String,
    pub message: String,
    pub confirm_label: String,
}

/// Modal dialog surface.
pub trait Dialogs: Send + Sync {
    fn open_alert(&self, cfg: AlertDialogConfig);
}
