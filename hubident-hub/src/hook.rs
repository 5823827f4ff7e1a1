use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::HookResult;

/// The parts of a pending notebook session a hook may inspect and change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpawnRequest {
    pub username: String,
    /// Image reference the session will run.
    pub image: String,
    /// Hub groups the user belongs to.
    pub groups: BTreeSet<String>,
    pub environment: BTreeMap<String, String>,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl SpawnRequest {
    pub fn new(username: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.environment.insert(key.into(), value.into());
    }

    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }

    /// Appends each trimmed argument that is not already present.
    pub fn append_args_if_absent<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref().trim();
            if !self.args.iter().any(|existing| existing == arg) {
                self.args.push(arg.to_string());
            }
        }
    }
}

/// Called by the hub right before a user's container is created.
///
/// Returning an error aborts the session start.
pub trait PreSpawnHook: Send + Sync {
    fn pre_spawn(&self, spawn: &mut SpawnRequest) -> HookResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_args_skips_existing_and_trims() {
        let mut spawn = SpawnRequest::new("alice", "img");
        spawn.args.push("--debug".into());
        spawn.append_args_if_absent([" --debug ", "--x", "--x"]);
        assert_eq!(spawn.args, vec!["--debug", "--x"]);
    }
}
