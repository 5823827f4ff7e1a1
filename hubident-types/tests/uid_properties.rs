//! Property-based tests for uid derivation.
//!
//! For every valid SID and base offset without overflow:
//! - the uid is exactly `base + rid`
//! - repeated derivations agree
//! - the text and binary SID forms give the same uid

use hubident_types::{derive_uid, SecurityId};
use proptest::prelude::*;

fn sub_authorities() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..4)
}

proptest! {
    #[test]
    fn uid_is_base_plus_rid(prefix in sub_authorities(), rid in 0u32..1_000_000_000, base in 0u32..2_000_000_000) {
        let mut text = String::from("S-1-5-21");
        for p in &prefix {
            text.push_str(&format!("-{p}"));
        }
        text.push_str(&format!("-{rid}"));
        let sid = SecurityId::parse(&text).unwrap();

        let uid = derive_uid(&sid, base).unwrap();
        prop_assert_eq!(uid, base + rid);
        prop_assert_eq!(derive_uid(&sid, base).unwrap(), uid);
    }

    #[test]
    fn binary_and_text_forms_agree(subs in prop::collection::vec(any::<u32>(), 1..6), base in 0u32..1_000) {
        let mut bytes = vec![1u8, subs.len() as u8, 0, 0, 0, 0, 0, 5];
        for s in &subs {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        let from_bin = SecurityId::from_bytes(&bytes).unwrap();
        let from_text = SecurityId::parse(from_bin.as_str()).unwrap();

        prop_assert_eq!(&from_bin, &from_text);
        prop_assert_eq!(
            derive_uid(&from_bin, base).ok(),
            base.checked_add(*subs.last().unwrap())
        );
    }
}
