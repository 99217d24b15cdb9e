//! Alias-to-origin hostname resolution.
//!
//! The map is built once from the configured host rules and never mutated,
//! so concurrent request handlers share it without locking.

use crate::config::HostRule;
use std::collections::HashMap;
use tracing::warn;

/// Static lookup from alias hostname to origin hostname.
///
/// Lookup is exact and case-sensitive. A missing alias is the sole error
/// condition: there is no partial match, no fallback origin, and no default
/// rule; the caller fails the request with 404.
#[derive(Debug)]
pub struct HostMap {
    origins: HashMap<String, String>,
}

impl HostMap {
    /// Build the map from the ordered rule set. On duplicate aliases the
    /// first rule wins.
    pub fn new(rules: &[HostRule]) -> Self {
        let mut origins = HashMap::with_capacity(rules.len());
        for rule in rules {
            if origins.contains_key(&rule.alias) {
                warn!(alias = %rule.alias, origin = %rule.origin, "ignoring duplicate alias rule");
                continue;
            }
            origins.insert(rule.alias.clone(), rule.origin.clone());
        }
        Self { origins }
    }

    /// Resolve the origin hostname for an alias, or `None` if unmapped.
    pub fn resolve_origin(&self, alias: &str) -> Option<&str> {
        self.origins.get(alias).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(origin: &str, alias: &str) -> HostRule {
        HostRule {
            origin: origin.to_string(),
            alias: alias.to_string(),
        }
    }

    #[test]
    fn test_resolve_known_alias() {
        let map = HostMap::new(&[rule("origin.example", "alias.example")]);
        assert_eq!(map.resolve_origin("alias.example"), Some("origin.example"));
    }

    #[test]
    fn test_resolve_unknown_alias() {
        let map = HostMap::new(&[rule("origin.example", "alias.example")]);
        assert_eq!(map.resolve_origin("other.example"), None);
        assert_eq!(map.resolve_origin(""), None);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let map = HostMap::new(&[rule("origin.example", "alias.example")]);
        assert_eq!(map.resolve_origin("Alias.example"), None);
        assert_eq!(map.resolve_origin("ALIAS.EXAMPLE"), None);
    }

    #[test]
    fn test_no_partial_match() {
        let map = HostMap::new(&[rule("origin.example", "alias.example")]);
        assert_eq!(map.resolve_origin("alias.example:8080"), None);
        assert_eq!(map.resolve_origin("sub.alias.example"), None);
    }

    #[test]
    fn test_first_rule_wins_on_duplicate_alias() {
        let map = HostMap::new(&[
            rule("first.internal", "www.example.com"),
            rule("second.internal", "www.example.com"),
        ]);
        assert_eq!(map.resolve_origin("www.example.com"), Some("first.internal"));
    }
}
