//! Origin-to-alias string substitution.

use crate::config::HostRule;

/// Scheme string for the alias side of a rewrite.
fn alias_scheme(alias_uses_https: bool) -> &'static str {
    if alias_uses_https {
        "https"
    } else {
        "http"
    }
}

/// Replace origin identifiers with their alias form throughout `text`.
///
/// For each rule, in rule-list order:
/// 1. every `http://<origin>` and `https://<origin>` becomes
///    `<scheme>://<alias>`, with the scheme taken from `alias_uses_https`;
/// 2. every remaining bare occurrence of the origin hostname becomes the
///    alias hostname.
///
/// Replacement is global and purely textual: no structural awareness, no
/// word-boundary checks. The full-URL phase runs strictly before the
/// bare-hostname phase, and rules are applied in sequence; both orderings
/// are observable when origin/alias strings overlap, so neither may be
/// changed.
pub fn rewrite_hosts(text: &str, rules: &[HostRule], alias_uses_https: bool) -> String {
    let scheme = alias_scheme(alias_uses_https);
    let mut content = text.to_string();
    for rule in rules {
        let alias_url = format!("{scheme}://{}", rule.alias);
        for origin_scheme in ["http", "https"] {
            let origin_url = format!("{origin_scheme}://{}", rule.origin);
            content = content.replace(&origin_url, &alias_url);
        }
        content = content.replace(&rule.origin, &rule.alias);
    }
    content
}
