use std::collections::BTreeSet;

use hubident_hub::groups::{allowed_groups, groups_from_dns, issuer_origin, normalize_claim_groups};
use pretty_assertions::assert_eq;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn leading_slash_is_stripped_once() {
    let groups = normalize_claim_groups(["/collaborative", "staff", "//odd", "/"]);
    assert_eq!(groups, set(&["collaborative", "staff", "/odd", ""]));
}

#[test]
fn normalized_groups_are_deduplicated() {
    let groups = normalize_claim_groups(vec!["/staff".to_string(), "staff".to_string()]);
    assert_eq!(groups, set(&["staff"]));
}

#[test]
fn only_configured_groups_survive() {
    let held = set(&["collaborative", "staff", "vpn-users"]);
    let allowed = set(&["collaborative", "admins"]);
    assert_eq!(allowed_groups(&held, &allowed), set(&["collaborative"]));
    assert!(allowed_groups(&held, &BTreeSet::new()).is_empty());
}

#[test]
fn group_names_from_dns() {
    let dns = [
        "cn=collaborative,ou=groups,dc=example,dc=org",
        "cn=staff, ou=groups,dc=example,dc=org",
        "uid=alice,ou=people,dc=example,dc=org",
        "CN=Upper,OU=groups",
    ];
    assert_eq!(groups_from_dns(dns), vec!["collaborative", "staff"]);
}

#[test]
fn origin_of_discovery_url() {
    assert_eq!(
        issuer_origin("https://sso.example.org/realms/lab/.well-known/openid-configuration"),
        Some("https://sso.example.org")
    );
    assert_eq!(issuer_origin("http://localhost:8080/x"), Some("http://localhost:8080"));
    assert_eq!(issuer_origin("ftp://example.org/"), None);
    assert_eq!(issuer_origin("sso.example.org"), None);
}
