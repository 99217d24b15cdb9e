//! Host rule configuration.

use serde::{Deserialize, Serialize};

/// A single alias-to-origin mapping.
///
/// Matching is exact and case-sensitive on the alias string; there is no
/// wildcard or port-aware matching. Rules are applied to response rewriting
/// in the order they appear in the configuration file, so with overlapping
/// origin/alias strings the order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostRule {
    /// The real backend hostname the proxy forwards requests to.
    pub origin: String,
    /// The public hostname clients use to reach the proxy.
    pub alias: String,
}
