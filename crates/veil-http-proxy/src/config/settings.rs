//! Process-level settings: listener address, upstream proxy, limits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Optional upstream HTTP proxy URL. When set, all outbound connections
    /// are routed through it. Validated lazily at forward time: a malformed
    /// URL surfaces per-request as 502, not as a startup failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Listen address, e.g. "127.0.0.1:8080".
    #[serde(default = "default_address")]
    pub address: String,

    /// Upper bound on buffered request bodies. Bodies are fully buffered so
    /// they can be replayed across redirects; the bound keeps adversarial
    /// uploads from consuming unbounded memory.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Deadline in seconds for each outbound request attempt.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy: None,
            address: default_address(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
