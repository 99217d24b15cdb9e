//! Configuration types for the Veil proxy.

mod rules;
mod settings;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use rules::HostRule;
pub use settings::Settings;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Ordered alias-to-origin mappings. Order matters for response
    /// rewriting when origin/alias strings overlap.
    #[serde(default)]
    pub host_rules: Vec<HostRule>,

    /// Scheme used when rewriting origin URLs to alias URLs: "https" when
    /// true, "http" otherwise.
    #[serde(default)]
    pub alias_uses_https: bool,

    /// Scheme used for outbound requests to origins (default: https).
    #[serde(default = "default_true")]
    pub origin_uses_https: bool,

    #[serde(default)]
    pub settings: Settings,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    ///
    /// Duplicate aliases and overlapping rule strings are operator concerns,
    /// not errors: the first matching rule wins and rules are applied in
    /// order, so they are logged and left alone.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.settings.address.is_empty() {
            anyhow::bail!("settings.address must not be empty");
        }

        for rule in &self.host_rules {
            if rule.origin.is_empty() || rule.alias.is_empty() {
                anyhow::bail!(
                    "host rule with empty origin or alias (origin: '{}', alias: '{}')",
                    rule.origin,
                    rule.alias
                );
            }
        }

        if self.host_rules.is_empty() {
            warn!("no host rules configured; every request will yield 404");
        }

        for (i, a) in self.host_rules.iter().enumerate() {
            for b in self.host_rules.iter().skip(i + 1) {
                if a.alias == b.alias {
                    warn!(
                        alias = %a.alias,
                        "duplicate alias in host rules; the first rule wins"
                    );
                }
                if a.origin != b.origin
                    && (a.origin.contains(&b.origin) || b.origin.contains(&a.origin))
                {
                    warn!(
                        first = %a.origin,
                        second = %b.origin,
                        "overlapping origin strings; rewrite outcome depends on rule order"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
host_rules:
  - origin: backend-a.internal
    alias: www.example.com
  - origin: backend-b.internal
    alias: api.example.com
alias_uses_https: true
settings:
  proxy: "http://squid.internal:3128"
  address: "127.0.0.1:8080"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.host_rules.len(), 2);
        assert_eq!(config.host_rules[0].origin, "backend-a.internal");
        assert_eq!(config.host_rules[0].alias, "www.example.com");
        assert_eq!(config.host_rules[1].alias, "api.example.com");
        assert!(config.alias_uses_https);
        assert!(config.origin_uses_https);
        assert_eq!(
            config.settings.proxy.as_deref(),
            Some("http://squid.internal:3128")
        );
        assert_eq!(config.settings.address, "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
host_rules:
  - origin: origin.example
    alias: alias.example
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.alias_uses_https);
        assert!(config.origin_uses_https);
        assert!(config.settings.proxy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_rule_fields() {
        let yaml = r#"
host_rules:
  - origin: ""
    alias: alias.example
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let yaml = r#"
host_rules:
  - origin: origin.example
    alias: alias.example
settings:
  address: ""
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_duplicate_aliases() {
        // First match wins; duplicates are an operator warning, not an error.
        let yaml = r#"
host_rules:
  - origin: first.internal
    alias: www.example.com
  - origin: second.internal
    alias: www.example.com
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let yaml = r#"
host_rules:
  - origin: origin.example
    alias: alias.example
alias_uses_https: true
settings:
  address: "127.0.0.1:0"
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, yaml).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.host_rules.len(), 1);
        assert!(config.alias_uses_https);

        assert!(Config::from_file(dir.path().join("missing.yml")).is_err());
    }
}
