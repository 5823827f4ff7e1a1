//! Security identifiers and the uid derivation built on them.
//!
//! A SID looks like `S-1-5-21-3623811015-3361044348-30300820-1013`. The last
//! component is the relative identifier (RID), unique within one domain.
//! Adding a fixed base offset to the RID gives every account a stable uid
//! that stays clear of the system-reserved range.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default offset added to the RID to form a uid.
pub const DEFAULT_BASE_UID: u32 = 1_615_200_000;

/// Textual security identifier of a directory account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityId(String);

impl SecurityId {
    /// Parses a SID from its textual form.
    ///
    /// Only the trailing component is interpreted; everything before it is
    /// kept verbatim. The string must contain at least one hyphen and end in
    /// an unsigned 32-bit integer written as plain decimal digits.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((_, rid)) = s.rsplit_once('-') else {
            return Err(Error::InvalidSecurityId(s.to_string()));
        };
        if rid.is_empty() || !rid.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidSecurityId(s.to_string()));
        }
        rid.parse::<u32>()
            .map_err(|_| Error::InvalidSecurityId(s.to_string()))?;
        Ok(Self(s.to_string()))
    }

    /// Decodes the binary `objectSid` form returned by Active Directory.
    ///
    /// Layout: revision (1 byte), sub-authority count (1 byte), identifier
    /// authority (6 bytes, big-endian), then `count` little-endian u32
    /// sub-authorities.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let invalid = || Error::InvalidSecurityId(format!("{} byte binary sid", bytes.len()));

        if bytes.len() < 8 {
            return Err(invalid());
        }
        let revision = bytes[0];
        let count = bytes[1] as usize;
        if count == 0 || bytes.len() != 8 + count * 4 {
            return Err(invalid());
        }

        let authority = bytes[2..8]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

        let mut text = format!("S-{revision}-{authority}");
        for chunk in bytes[8..].chunks_exact(4) {
            let sub = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            text.push('-');
            text.push_str(&sub.to_string());
        }
        Ok(Self(text))
    }

    /// Returns the relative identifier (last component).
    #[must_use]
    pub fn relative_id(&self) -> u32 {
        // Validated on construction.
        self.0
            .rsplit_once('-')
            .and_then(|(_, rid)| rid.parse().ok())
            .unwrap_or_default()
    }

    /// Returns the uid for this SID under the given base offset.
    pub fn to_uid(&self, base_uid: u32) -> Result<u32> {
        derive_uid(self, base_uid)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `base_uid + rid(sid)`, failing instead of wrapping.
pub fn derive_uid(sid: &SecurityId, base_uid: u32) -> Result<u32> {
    let rid = sid.relative_id();
    base_uid
        .checked_add(rid)
        .ok_or(Error::UidOverflow { base: base_uid, rid })
}

impl fmt::Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SecurityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SecurityId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<SecurityId> for String {
    fn from(sid: SecurityId) -> Self {
        sid.0
    }
}
