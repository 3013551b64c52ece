//! Dashboard API endpoint builders.
//!
//! Endpoints are relative paths (`api/v1/...`); the transport joins them onto
//! its base URL. Placeholders `:namespace` and `:name` are substituted by
//! [`ResourceEndpoint::resolve`].

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use crate::TypeMeta;

pub const BASE_HREF: &str = "api/v1";
pub const NAMESPACE_PLACEHOLDER: &str = ":namespace";
pub const NAME_PLACEHOLDER: &str = ":name";

/// Resource kinds this view talks about, spelled the way the backend routes them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Meshconfig,
    Pod,
    Ingress,
    Event,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Meshconfig => "meshconfig",
            Resource::Pod => "pod",
            Resource::Ingress => "ingress",
            Resource::Event => "event",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint builder for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEndpoint {
    resource: Resource,
    namespaced: bool,
}

impl ResourceEndpoint {
    pub fn new(resource: Resource, namespaced: bool) -> Self {
        Self { resource, namespaced }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn list(&self) -> String {
        if self.namespaced {
            format!("{}/{}/{}", BASE_HREF, self.resource, NAMESPACE_PLACEHOLDER)
        } else {
            format!("{}/{}", BASE_HREF, self.resource)
        }
    }

    /// Detail template with `:namespace` (when namespaced) and `:name` placeholders.
    pub fn detail(&self) -> String {
        format!("{}/{}", self.list(), NAME_PLACEHOLDER)
    }

    /// Listing endpoint of `related` objects owned by `name`. An empty namespace
    /// keeps the `:namespace` placeholder for the consumer to fill.
    pub fn child(&self, name: &str, related: Resource, namespace: &str) -> String {
        let ns = if namespace.is_empty() { NAMESPACE_PLACEHOLDER } else { namespace };
        if self.namespaced {
            format!("{}/{}/{}/{}/{}", BASE_HREF, self.resource, ns, name, related)
        } else {
            format!("{}/{}/{}/{}", BASE_HREF, self.resource, name, related)
        }
    }

    /// Substitute placeholders in a template produced by [`Self::detail`] or [`Self::list`].
    pub fn resolve(template: &str, name: &str, namespace: &str) -> String {
        template.replace(NAMESPACE_PLACEHOLDER, namespace).replace(NAME_PLACEHOLDER, name)
    }

    /// The three sibling-view endpoints of a detail page.
    pub fn children(&self, name: &str, namespace: &str) -> EndpointSet {
        EndpointSet {
            pods: self.child(name, Resource::Pod, namespace),
            ingress: self.child(name, Resource::Ingress, namespace),
            events: self.child(name, Resource::Event, namespace),
        }
    }
}

/// Child listing endpoints consumed by sibling views; never fetched by the detail view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointSet {
    pub pods: String,
    pub ingress: String,
    pub events: String,
}

/// Canonical raw-document URL of an object.
pub fn raw_url(type_meta: &TypeMeta, object_meta: &ObjectMeta) -> String {
    let mut url = format!("{}/_raw/{}", BASE_HREF, type_meta.kind);
    if let Some(ns) = object_meta.namespace.as_deref() {
        url.push_str("/namespace/");
        url.push_str(ns);
    }
    url.push_str("/name/");
    url.push_str(object_meta.name.as_deref().unwrap_or_default());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_detail_and_list() {
        let ep = ResourceEndpoint::new(Resource::Meshconfig, true);
        assert_eq!(ep.list(), "api/v1/meshconfig/:namespace");
        assert_eq!(ep.detail(), "api/v1/meshconfig/:namespace/:name");
        assert_eq!(
            ResourceEndpoint::resolve(&ep.detail(), "osm-mesh-config", "osm-system"),
            "api/v1/meshconfig/osm-system/osm-mesh-config"
        );
    }

    #[test]
    fn cluster_scoped_detail() {
        let ep = ResourceEndpoint::new(Resource::Meshconfig, false);
        assert_eq!(ep.detail(), "api/v1/meshconfig/:name");
        assert_eq!(ResourceEndpoint::resolve(&ep.detail(), "m", "ignored"), "api/v1/meshconfig/m");
        assert_eq!(ep.child("m", Resource::Pod, "ns"), "api/v1/meshconfig/m/pod");
    }

    #[test]
    fn children_are_scoped_to_name_and_namespace() {
        let set = ResourceEndpoint::new(Resource::Meshconfig, true).children("mc", "osm");
        assert_eq!(set.pods, "api/v1/meshconfig/osm/mc/pod");
        assert_eq!(set.ingress, "api/v1/meshconfig/osm/mc/ingress");
        assert_eq!(set.events, "api/v1/meshconfig/osm/mc/event");
    }

    #[test]
    fn child_without_namespace_keeps_placeholder() {
        let ep = ResourceEndpoint::new(Resource::Meshconfig, true);
        assert_eq!(ep.child("mc", Resource::Event, ""), "api/v1/meshconfig/:namespace/mc/event");
    }

    #[test]
    fn raw_url_with_and_without_namespace() {
        let tm = TypeMeta { kind: "meshconfig".into(), ..Default::default() };
        let mut om = ObjectMeta { name: Some("mc".into()), namespace: Some("osm".into()), ..Default::default() };
        assert_eq!(raw_url(&tm, &om), "api/v1/_raw/meshconfig/namespace/osm/name/mc");
        om.namespace = None;
        assert_eq!(raw_url(&tm, &om), "api/v1/_raw/meshconfig/name/mc");
    }
}
