//! Helpers for group claims handed over by the OIDC provider.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex_lite::Regex;

static GROUP_DN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cn=([^,]+),\s?ou=([^,]+)").expect("valid regex"));

static ORIGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://[^/]+)").expect("valid regex"));

/// Strips the leading `/` that Keycloak-style providers put on group paths.
pub fn normalize_claim_groups<I, S>(groups: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    groups
        .into_iter()
        .map(|g| {
            let g = g.as_ref();
            g.strip_prefix('/').unwrap_or(g).to_string()
        })
        .collect()
}

/// Groups the hub is configured to manage, out of the ones a user holds.
pub fn allowed_groups(groups: &BTreeSet<String>, allowed: &BTreeSet<String>) -> BTreeSet<String> {
    groups.intersection(allowed).cloned().collect()
}

/// Group names from `cn=<group>,ou=<unit>,...` DNs. Other DNs are skipped.
pub fn groups_from_dns<I, S>(dns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dns.into_iter()
        .filter_map(|dn| {
            GROUP_DN
                .captures(dn.as_ref())
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// `scheme://host[:port]` of a discovery URL.
pub fn issuer_origin(discovery_url: &str) -> Option<&str> {
    ORIGIN
        .captures(discovery_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
