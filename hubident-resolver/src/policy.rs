use std::collections::BTreeSet;

use hubident_types::{ForcedGroup, IdentityRecord};
use serde::{Deserialize, Serialize};

/// Static rules applied around every resolution.
///
/// Overrides only touch the copy handed back to the caller; cached records
/// keep the directory-derived gid and group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Shared group replacing the per-user private group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_group: Option<ForcedGroup>,

    /// When set, only these usernames resolve. An empty set admits nobody.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_list: Option<BTreeSet<String>>,

    /// Extra groups added to every resolved identity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub append_groups: Vec<String>,
}

impl CachePolicy {
    pub fn with_force_group(mut self, group: ForcedGroup) -> Self {
        self.force_group = Some(group);
        self
    }

    pub fn with_allow_list<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = Some(users.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_append_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.append_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_allowed(&self, username: &str) -> bool {
        self.allow_list
            .as_ref()
            .is_none_or(|allowed| allowed.contains(username))
    }

    /// Applies the forced group and appended groups in place.
    pub fn apply(&self, record: &mut IdentityRecord) {
        if let Some(group) = &self.force_group {
            record.apply_forced_group(group);
        }
        record.append_groups(&self.append_groups);
    }
}
