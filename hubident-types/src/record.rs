use crate::{derive_uid, Result, SecurityId};
use serde::{Deserialize, Serialize};

/// A resolved user identity.
///
/// `numeric_uid` is always derived from `security_id`; it never changes for
/// the same account as long as the base offset stays the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub username: String,
    pub display_name: String,
    pub numeric_uid: u32,
    pub numeric_gid: u32,
    pub group_name: String,
    pub security_id: SecurityId,
    pub distinguished_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Extra group names appended by policy. Not persisted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl IdentityRecord {
    /// Builds a record from directory attributes.
    ///
    /// The account gets a private group: gid equals uid and the group is
    /// named after the user.
    pub fn from_directory(
        username: impl Into<String>,
        display_name: impl Into<String>,
        security_id: SecurityId,
        distinguished_name: impl Into<String>,
        email: Option<String>,
        base_uid: u32,
    ) -> Result<Self> {
        let username = username.into();
        let uid = derive_uid(&security_id, base_uid)?;
        Ok(Self {
            group_name: username.clone(),
            username,
            display_name: display_name.into(),
            numeric_uid: uid,
            numeric_gid: uid,
            security_id,
            distinguished_name: distinguished_name.into(),
            email,
            groups: Vec::new(),
        })
    }

    /// Replaces gid and group name with a shared group.
    pub fn apply_forced_group(&mut self, group: &ForcedGroup) {
        self.numeric_gid = group.gid;
        self.group_name = group.name.clone();
    }

    /// Appends groups not already present, keeping order.
    pub fn append_groups<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for g in groups {
            let g = g.as_ref();
            if !self.groups.iter().any(|existing| existing == g) {
                self.groups.push(g.to_string());
            }
        }
    }
}

/// Shared group forced onto every resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedGroup {
    pub gid: u32,
    pub name: String,
}

impl ForcedGroup {
    pub fn new(gid: u32, name: impl Into<String>) -> Self {
        Self {
            gid,
            name: name.into(),
        }
    }
}
