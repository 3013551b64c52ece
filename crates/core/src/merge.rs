//! Spec overlay for read-modify-write saves, plus a minimal structural diff.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Error returned when the fetched document cannot carry a `spec` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored document is not a JSON object")]
pub struct NotAnObject;

/// Replace `doc.spec` with a deep copy of `spec`. Every other key of `doc`
/// is left exactly as fetched.
pub fn overlay_spec(mut doc: Json, spec: &Json) -> Result<Json, NotAnObject> {
    let obj = doc.as_object_mut().ok_or(NotAnObject)?;
    obj.insert("spec".into(), spec.clone());
    Ok(doc)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSummary { pub adds: usize, pub updates: usize, pub removes: usize }

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "adds={} updates={} removes={}", self.adds, self.updates, self.removes)
    }
}

/// Count keys/elements added, updated and removed going from `base` to `target`.
pub fn diff_summary(target: &Json, base: &Json) -> DiffSummary {
    fn walk(a: &Json, b: &Json, out: &mut DiffSummary) {
        match (a, b) {
            (Json::Object(ao), Json::Object(bo)) => {
                for (k, av) in ao.iter() {
                    match bo.get(k) {
                        Some(bv) if av == bv => {}
                        Some(bv) => walk(av, bv, out),
                        None => out.adds += 1,
                    }
                }
                out.removes += bo.keys().filter(|k| !ao.contains_key(*k)).count();
            }
            (Json::Array(aa), Json::Array(bb)) => {
                out.updates += aa.iter().zip(bb.iter()).filter(|(x, y)| x != y).count();
                if aa.len() > bb.len() { out.adds += aa.len() - bb.len(); }
                if bb.len() > aa.len() { out.removes += bb.len() - aa.len(); }
            }
            (av, bv) => { if av != bv { out.updates += 1; } }
        }
    }
    let mut out = DiffSummary::default();
    walk(target, base, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_replaces_only_spec() {
        let fetched = json!({
            "apiVersion": "config.openservicemesh.io/v1alpha1",
            "kind": "MeshConfig",
            "metadata": { "name": "mc", "resourceVersion": "42" },
            "spec": { "sidecar": { "logLevel": "error" }, "traffic": { "enableEgress": true } },
            "status": { "x": 1 }
        });
        let spec = json!({ "sidecar": { "logLevel": "info" } });
        let merged = overlay_spec(fetched.clone(), &spec).expect("object");
        assert_eq!(merged["spec"], spec);
        for key in ["apiVersion", "kind", "metadata", "status"] {
            assert_eq!(merged[key], fetched[key], "key {key}");
        }
    }

    #[test]
    fn overlay_adds_spec_when_missing() {
        let merged = overlay_spec(json!({ "kind": "MeshConfig" }), &json!({ "a": 1 })).expect("object");
        assert_eq!(merged["spec"]["a"], 1);
    }

    #[test]
    fn overlay_rejects_non_object() {
        assert_eq!(overlay_spec(json!([1, 2]), &json!({})), Err(NotAnObject));
        assert_eq!(NotAnObject.to_string(), "stored document is not a JSON object");
    }

    #[test]
    fn diff_summary_counts_adds_updates_removes() {
        let base = json!({ "a": 1, "b": { "x": 1 }, "c": [1, 2, 3] });
        let target = json!({ "a": 2, "b": { "x": 1, "y": 2 }, "c": [1, 9], "d": true });
        let s = diff_summary(&target, &base);
        assert_eq!(s, DiffSummary { adds: 2, updates: 2, removes: 1 });
        assert_eq!(s.to_string(), "adds=2 updates=2 removes=1");
    }
}
