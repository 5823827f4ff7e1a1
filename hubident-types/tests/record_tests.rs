use hubident_types::{ForcedGroup, IdentityRecord, SecurityId};
use pretty_assertions::assert_eq;

fn alice() -> IdentityRecord {
    IdentityRecord::from_directory(
        "alice",
        "Alice Liddell",
        SecurityId::parse("S-1-5-21-1-2-3-5000").unwrap(),
        "CN=Alice Liddell,OU=Staff,DC=example,DC=org",
        Some("alice@example.org".into()),
        1_615_200_000,
    )
    .unwrap()
}

#[test]
fn from_directory_uses_private_group() {
    let rec = alice();
    assert_eq!(rec.numeric_uid, 1_615_205_000);
    assert_eq!(rec.numeric_gid, rec.numeric_uid);
    assert_eq!(rec.group_name, "alice");
    assert!(rec.groups.is_empty());
}

#[test]
fn from_directory_propagates_overflow() {
    let res = IdentityRecord::from_directory(
        "bob",
        "Bob",
        SecurityId::parse("S-1-5-21-4000000000").unwrap(),
        "CN=Bob",
        None,
        1_615_200_000,
    );
    assert!(res.is_err());
}

#[test]
fn forced_group_replaces_gid_and_name_only() {
    let mut rec = alice();
    rec.apply_forced_group(&ForcedGroup::new(2000, "shared"));
    assert_eq!(rec.numeric_gid, 2000);
    assert_eq!(rec.group_name, "shared");
    assert_eq!(rec.numeric_uid, 1_615_205_000);
    assert_eq!(rec.username, "alice");
}

#[test]
fn append_groups_skips_duplicates() {
    let mut rec = alice();
    rec.append_groups(["docker", "users"]);
    rec.append_groups(vec!["users".to_string(), "gpu".to_string()]);
    assert_eq!(rec.groups, vec!["docker", "users", "gpu"]);
}

#[test]
fn json_omits_empty_optional_fields() {
    let mut rec = alice();
    rec.email = None;
    let json = serde_json::to_value(&rec).unwrap();
    assert!(json.get("email").is_none());
    assert!(json.get("groups").is_none());
    assert_eq!(json["security_id"], "S-1-5-21-1-2-3-5000");

    let back: IdentityRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, rec);
}
