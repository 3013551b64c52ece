use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9090/";

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn http_timeout() -> Duration {
    let secs = std::env::var("MESHDASH_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}

/// Connection settings for [`crate::HttpApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Dashboard root; relative `api/v1/...` endpoints are joined onto it.
    pub base_url: String,
    pub timeout: Duration,
    /// Bearer token sent as `Authorization` when set.
    pub token: Option<String>,
    /// Prometheus base URL for metric queries.
    pub prom_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: Duration::from_secs(30), token: None, prom_url: None }
    }
}

impl ClientConfig {
    /// Read `MESHDASH_BASE_URL`, `MESHDASH_HTTP_TIMEOUT_SECS`, `MESHDASH_TOKEN`
    /// and `MESHDASH_PROM_URL`, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("MESHDASH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: http_timeout(),
            token: env_string("MESHDASH_TOKEN"),
            prom_url: env_string("MESHDASH_PROM_URL"),
        }
    }

    /// Join a relative endpoint onto the base URL. Absolute URLs pass through.
    pub fn join(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        let cfg = ClientConfig { base_url: "http://dash:9090/".into(), ..Default::default() };
        assert_eq!(cfg.join("api/v1/meshconfig/ns/n"), "http://dash:9090/api/v1/meshconfig/ns/n");
        assert_eq!(cfg.join("/api/v1/x"), "http://dash:9090/api/v1/x");
        assert_eq!(cfg.join("https://other/x"), "https://other/x");
    }

    #[test]
    fn default_points_at_localhost() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.token.is_none());
    }
}
