use std::collections::HashMap;

use hubident_directory::{
    record_from_entry, records_from_entries, DirectoryClient, DirectoryConnectionConfig, DirectoryError,
    DirectorySource, LdapDirectory,
};
use ldap3::SearchEntry;
use pretty_assertions::assert_eq;

fn config() -> DirectoryConnectionConfig {
    DirectoryConnectionConfig::new("dc01.example.org", "DC=example,DC=org")
        .with_credentials("CN=svc,DC=example,DC=org", "pw")
        .with_username_attribute("sAMAccountName")
}

fn entry(attrs: &[(&str, &str)], bin: &[(&str, Vec<u8>)]) -> SearchEntry {
    SearchEntry {
        dn: "CN=Alice Liddell,OU=Staff,DC=example,DC=org".to_string(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
            .collect::<HashMap<_, _>>(),
        bin_attrs: bin
            .iter()
            .map(|(k, v)| (k.to_string(), vec![v.clone()]))
            .collect::<HashMap<_, _>>(),
    }
}

fn binary_sid(subs: &[u32]) -> Vec<u8> {
    let mut bytes = vec![1u8, subs.len() as u8, 0, 0, 0, 0, 0, 5];
    for s in subs {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

// ── Entry mapping ────────────────────────────────────────────────

#[test]
fn maps_text_sid_entry() {
    let e = entry(
        &[
            ("objectSid", "S-1-5-21-1-2-3-5000"),
            ("cn", "Alice Liddell"),
            ("mail", "alice@example.org"),
            ("sAMAccountName", "alice"),
        ],
        &[],
    );
    let rec = record_from_entry(&e, None, &config()).unwrap();
    assert_eq!(rec.username, "alice");
    assert_eq!(rec.display_name, "Alice Liddell");
    assert_eq!(rec.numeric_uid, 1_615_205_000);
    assert_eq!(rec.numeric_gid, 1_615_205_000);
    assert_eq!(rec.group_name, "alice");
    assert_eq!(rec.email.as_deref(), Some("alice@example.org"));
    assert_eq!(rec.distinguished_name, "CN=Alice Liddell,OU=Staff,DC=example,DC=org");
}

#[test]
fn maps_binary_sid_entry() {
    let e = entry(
        &[("cn", "Alice Liddell"), ("sAMAccountName", "alice")],
        &[("objectSid", binary_sid(&[21, 11, 22, 33, 1104]))],
    );
    let rec = record_from_entry(&e, None, &config()).unwrap();
    assert_eq!(rec.security_id.as_str(), "S-1-5-21-11-22-33-1104");
    assert_eq!(rec.numeric_uid, 1_615_201_104);
    assert_eq!(rec.email, None);
}

#[test]
fn attribute_names_match_case_insensitively() {
    let e = entry(
        &[("OBJECTSID", "S-1-5-21-9-77"), ("CN", "Bob"), ("samaccountname", "bob")],
        &[],
    );
    let rec = record_from_entry(&e, None, &config()).unwrap();
    assert_eq!(rec.username, "bob");
    assert_eq!(rec.display_name, "Bob");
}

#[test]
fn directory_spelling_wins_over_requested_name() {
    let e = entry(&[("objectSid", "S-1-5-21-9-77"), ("sAMAccountName", "alice")], &[]);
    let upper = record_from_entry(&e, Some("Alice"), &config()).unwrap();
    let lower = record_from_entry(&e, Some("alice"), &config()).unwrap();
    assert_eq!(upper.username, "alice");
    assert_eq!(upper, lower);
}

#[test]
fn requested_name_fills_missing_attribute() {
    let e = entry(&[("objectSid", "S-1-5-21-9-77")], &[]);
    let rec = record_from_entry(&e, Some("alice"), &config()).unwrap();
    assert_eq!(rec.username, "alice");
    assert_eq!(rec.display_name, "alice");
}

#[test]
fn missing_sid_is_invalid_entry() {
    let e = entry(&[("cn", "Svc"), ("sAMAccountName", "svc")], &[]);
    let err = record_from_entry(&e, None, &config()).unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidEntry { ref reason, .. } if reason.contains("objectSid")));
}

#[test]
fn missing_username_is_invalid_entry() {
    let e = entry(&[("objectSid", "S-1-5-21-9-77")], &[]);
    assert!(matches!(
        record_from_entry(&e, None, &config()),
        Err(DirectoryError::InvalidEntry { .. })
    ));
}

#[test]
fn base_uid_is_taken_from_config() {
    let e = entry(&[("objectSid", "S-1-5-21-9-77"), ("sAMAccountName", "x")], &[]);
    let rec = record_from_entry(&e, None, &config().with_base_uid(100_000)).unwrap();
    assert_eq!(rec.numeric_uid, 100_077);
}

#[test]
fn uid_overflow_is_invalid_entry() {
    let e = entry(&[("objectSid", "S-1-5-21-9-4294967000"), ("sAMAccountName", "x")], &[]);
    assert!(matches!(
        record_from_entry(&e, None, &config()),
        Err(DirectoryError::InvalidEntry { .. })
    ));
}

#[test]
fn listing_skips_unusable_entries() {
    let mut no_username = entry(&[("objectSid", "S-1-5-21-9-78"), ("cn", "Printer")], &[]);
    no_username.dn = "CN=Printer,DC=example,DC=org".into();
    let mut no_sid = entry(&[("sAMAccountName", "svc")], &[]);
    no_sid.dn = "CN=svc,DC=example,DC=org".into();
    let entries = vec![
        entry(&[("objectSid", "S-1-5-21-9-77"), ("sAMAccountName", "alice")], &[]),
        no_username,
        no_sid,
        entry(&[("sAMAccountName", "bob")], &[("objectSid", binary_sid(&[21, 9, 1104]))]),
    ];

    let records: Vec<_> = records_from_entries(entries, &config())
        .collect::<Result<_, _>>()
        .unwrap();
    let names: Vec<_> = records.iter().map(|r| r.username.as_str()).collect();
    assert_eq!(names, ["alice", "bob"]);
    assert_eq!(records[1].numeric_uid, 1_615_201_104);
}

#[test]
fn empty_listing_yields_nothing() {
    assert_eq!(records_from_entries(Vec::new(), &config()).count(), 0);
}

// ── Session lifecycle without a server ───────────────────────────

#[test]
fn new_rejects_invalid_config() {
    let cfg = DirectoryConnectionConfig::new("", "DC=example,DC=org");
    assert!(LdapDirectory::new(cfg).is_err());
}

#[test]
fn connect_without_credentials_is_config_error() {
    let dir = LdapDirectory::new(DirectoryConnectionConfig::new("127.0.0.1", "DC=x")).unwrap();
    let mut session = dir.session();
    assert!(matches!(session.connect(), Err(DirectoryError::Config(_))));
    assert!(!session.is_connected());
}

#[test]
fn lookup_without_credentials_is_config_error() {
    let dir = LdapDirectory::new(DirectoryConnectionConfig::new("127.0.0.1", "DC=x")).unwrap();
    let mut session = dir.session();
    assert!(matches!(
        session.lookup_by_username("alice"),
        Err(DirectoryError::Config(_))
    ));
}

#[test]
fn disconnect_is_idempotent() {
    let dir = LdapDirectory::new(config()).unwrap();
    let mut session = dir.session();
    assert!(session.disconnect().is_ok());
    assert!(session.disconnect().is_ok());
    assert!(!session.is_connected());
}

#[test]
fn unreachable_server_is_connection_error() {
    let mut cfg = config();
    cfg.host = "127.0.0.1".into();
    cfg.port = 1;
    cfg.connect_timeout_secs = 2;
    let dir = LdapDirectory::new(cfg).unwrap();
    let mut session = dir.session();
    let err = session.connect().unwrap_err();
    assert!(matches!(err, DirectoryError::Connection(_)));
    assert!(err.is_transient());
}
