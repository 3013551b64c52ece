//! Meshdash core types: the mesh-config detail model as the dashboard backend
//! serves it, endpoint builders and the `spec` overlay used on save.

#![forbid(unsafe_code)]

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

pub mod endpoint;
pub mod merge;

pub use endpoint::{raw_url, EndpointSet, Resource, ResourceEndpoint};

/// Kind label announced to the action bar for this detail view.
pub const MESHCONFIG_LABEL: &str = "Meshconfig";

/// Type metadata as emitted by the dashboard backend (not the apiserver's
/// `apiVersion`/`kind` pair).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// Lowercase resource kind, e.g. `meshconfig`.
    pub kind: String,
    #[serde(default)]
    pub scalable: bool,
    #[serde(default)]
    pub restartable: bool,
}

/// Status payload carried by a non-fatal backend error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: String,
}

/// Warning collected by the backend while assembling a detail response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct K8sError {
    #[serde(rename = "ErrStatus")]
    pub err_status: ErrStatus,
}

impl K8sError {
    pub fn message(&self) -> &str {
        &self.err_status.message
    }
}

/// Full detail representation of a mesh config.
///
/// `spec` stays untyped so fields this client does not know about survive an
/// edit round-trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeshconfigDetail {
    pub type_meta: TypeMeta,
    pub object_meta: ObjectMeta,
    #[serde(default)]
    pub spec: serde_json::Value,
    #[serde(default)]
    pub errors: Vec<K8sError>,
}

impl MeshconfigDetail {
    pub fn name(&self) -> &str {
        self.object_meta.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.object_meta.namespace.as_deref()
    }

    /// Canonical raw URL of the stored document.
    pub fn raw_url(&self) -> String {
        raw_url(&self.type_meta, &self.object_meta)
    }
}

/// Identity handed to the action bar for breadcrumbs and title rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMeta {
    pub display_name: String,
    pub object_meta: ObjectMeta,
    pub type_meta: TypeMeta,
}

impl ResourceMeta {
    pub fn new(display_name: impl Into<String>, object_meta: ObjectMeta, type_meta: TypeMeta) -> Self {
        Self { display_name: display_name.into(), object_meta, type_meta }
    }
}

/// Sidecar log levels offered by the edit form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Info,
}

impl LogLevel {
    pub fn options() -> &'static [LogLevel] {
        &[LogLevel::Error, LogLevel::Info]
    }

    pub fn value(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Info => "Info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::options().iter().copied().find(|l| l.value().eq_ignore_ascii_case(s))
    }
}

/// Read `sidecar.logLevel` from a mesh-config spec.
pub fn sidecar_log_level(spec: &serde_json::Value) -> Option<LogLevel> {
    spec.get("sidecar")
        .and_then(|s| s.get("logLevel"))
        .and_then(|v| v.as_str())
        .and_then(LogLevel::parse)
}

/// Write `sidecar.logLevel`, creating the `sidecar` object if needed.
/// A non-object spec is replaced by an object.
pub fn set_sidecar_log_level(spec: &mut serde_json::Value, level: LogLevel) {
    if !spec.is_object() {
        *spec = serde_json::Value::Object(serde_json::Map::new());
    }
    let Some(root) = spec.as_object_mut() else { return };
    let sidecar = root
        .entry("sidecar")
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    if !sidecar.is_object() {
        *sidecar = serde_json::Value::Object(serde_json::Map::new());
    }
    if let Some(obj) = sidecar.as_object_mut() {
        obj.insert("logLevel".into(), serde_json::Value::String(level.value().to_string()));
    }
}

pub mod prelude {
    pub use super::{
        EndpointSet, ErrStatus, K8sError, LogLevel, MeshconfigDetail, Resource, ResourceEndpoint, ResourceMeta,
        TypeMeta, MESHCONFIG_LABEL,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_decodes_backend_payload() {
        let raw = serde_json::json!({
            "typeMeta": { "kind": "meshconfig", "scalable": false, "restartable": false },
            "objectMeta": {
                "name": "osm-mesh-config",
                "namespace": "osm-system",
                "labels": { "app": "osm" },
                "creationTimestamp": "2022-03-01T10:00:00Z"
            },
            "spec": { "sidecar": { "logLevel": "error", "enablePrivilegedInitContainer": false } },
            "errors": [ { "ErrStatus": { "message": "forbidden: pods", "code": 403, "status": "Failure", "reason": "Forbidden" } } ]
        });
        let d: MeshconfigDetail = serde_json::from_value(raw).expect("decode");
        assert_eq!(d.name(), "osm-mesh-config");
        assert_eq!(d.namespace(), Some("osm-system"));
        assert_eq!(d.type_meta.kind, "meshconfig");
        assert_eq!(d.errors.len(), 1);
        assert_eq!(d.errors[0].message(), "forbidden: pods");
        assert_eq!(sidecar_log_level(&d.spec), Some(LogLevel::Error));
    }

    #[test]
    fn missing_errors_default_to_empty() {
        let raw = serde_json::json!({
            "typeMeta": { "kind": "meshconfig" },
            "objectMeta": { "name": "m" },
            "spec": {}
        });
        let d: MeshconfigDetail = serde_json::from_value(raw).expect("decode");
        assert!(d.errors.is_empty());
        assert_eq!(d.namespace(), None);
    }

    #[test]
    fn log_level_options_and_parse() {
        let values: Vec<_> = LogLevel::options().iter().map(|l| (l.value(), l.label())).collect();
        assert_eq!(values, vec![("error", "Error"), ("info", "Info")]);
        assert_eq!(LogLevel::parse("INFO"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("debug"), None);
    }

    #[test]
    fn set_log_level_keeps_sibling_fields() {
        let mut spec = serde_json::json!({ "sidecar": { "logLevel": "error", "configResyncInterval": "0s" }, "traffic": {} });
        set_sidecar_log_level(&mut spec, LogLevel::Info);
        assert_eq!(spec["sidecar"]["logLevel"], "info");
        assert_eq!(spec["sidecar"]["configResyncInterval"], "0s");
        assert!(spec.get("traffic").is_some());

        let mut empty = serde_json::Value::Null;
        set_sidecar_log_level(&mut empty, LogLevel::Error);
        assert_eq!(sidecar_log_level(&empty), Some(LogLevel::Error));
    }
}
