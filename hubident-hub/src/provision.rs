//! The pre-spawn hook that sets a session's identity and options.

use hubident_cache::IdentityStore;
use hubident_directory::DirectorySource;
use hubident_resolver::{IdentityResolver, Resolution};
use hubident_types::IdentityRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::hook::{PreSpawnHook, SpawnRequest};
use crate::images::ImageCatalog;
use crate::{HookError, HookResult};

/// Hub group whose members get real-time collaboration.
pub const COLLABORATIVE_GROUP: &str = "collaborative";

const COLLAB_ENABLE_ARGS: &[&str] = &["--LabApp.collaborative=True"];
const COLLAB_DISABLE_ARGS: &[&str] = &[
    "--LabApp.collaborative=False",
    "--YDocExtension.disable_rtc=True",
];

/// Where a session's uid, gid and names come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSource {
    /// When false the image's own user is left in place.
    #[serde(default)]
    pub enable: bool,
    /// Resolve through the directory instead of using the defaults below.
    #[serde(default)]
    pub from_directory: bool,
    #[serde(default = "default_id")]
    pub default_uid: u32,
    #[serde(default = "default_id")]
    pub default_gid: u32,
    #[serde(default = "default_group")]
    pub default_group: String,
}

fn default_id() -> u32 {
    1000
}

fn default_group() -> String {
    "users".to_string()
}

impl Default for UserSource {
    fn default() -> Self {
        Self {
            enable: false,
            from_directory: false,
            default_uid: default_id(),
            default_gid: default_id(),
            default_group: default_group(),
        }
    }
}

/// Credential handed to the notebook's assistant extension.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enable: bool,
    /// Environment variable to set.
    pub name: String,
    #[serde(skip_serializing)]
    pub key: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("enable", &self.enable)
            .field("name", &self.name)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Sets up identity, assistant credentials and collaboration flags for each
/// session start.
pub struct Provisioner<D, S> {
    resolver: Option<IdentityResolver<D, S>>,
    user_source: UserSource,
    ai: Option<AiConfig>,
    images: ImageCatalog,
}

impl<D, S> Provisioner<D, S>
where
    D: DirectorySource,
    S: IdentityStore,
{
    pub fn new(resolver: Option<IdentityResolver<D, S>>, user_source: UserSource) -> Self {
        Self {
            resolver,
            user_source,
            ai: None,
            images: ImageCatalog::default(),
        }
    }

    /// Only enabled configs take effect.
    pub fn with_ai(mut self, ai: Option<AiConfig>) -> Self {
        self.ai = ai.filter(|ai| ai.enable);
        self
    }

    pub fn with_images(mut self, images: ImageCatalog) -> Self {
        self.images = images;
        self
    }

    pub fn resolver(&self) -> Option<&IdentityResolver<D, S>> {
        self.resolver.as_ref()
    }

    fn apply_identity(&self, spawn: &mut SpawnRequest) -> HookResult<()> {
        if let Some(resolver) = &self.resolver {
            if !resolver.policy().is_allowed(&spawn.username) {
                return Err(HookError::Rejected(spawn.username.clone()));
            }
        }

        if !self.user_source.enable {
            debug!(user = %spawn.username, "Keeping image user");
            return Ok(());
        }

        if !self.user_source.from_directory {
            let source = &self.user_source;
            let username = spawn.username.clone();
            set_identity(
                spawn,
                source.default_uid,
                source.default_gid,
                &username,
                &source.default_group,
            );
            return Ok(());
        }

        let resolver = self.resolver.as_ref().ok_or_else(|| {
            HookError::Config("user_update.from_directory needs an enabled directory".into())
        })?;
        match resolver.resolve(&spawn.username)? {
            Resolution::Resolved(record) => {
                apply_record(spawn, &record);
                info!(user = %record.username, uid = record.numeric_uid, gid = record.numeric_gid, "Applied directory identity");
                Ok(())
            }
            Resolution::Rejected => Err(HookError::Rejected(spawn.username.clone())),
            Resolution::NotFound => Err(HookError::NotFound(spawn.username.clone())),
        }
    }

    fn apply_ai(&self, spawn: &mut SpawnRequest) {
        if let Some(ai) = &self.ai {
            spawn.set_env(ai.name.clone(), ai.key.clone());
        }
    }

    fn apply_collaboration(&self, spawn: &mut SpawnRequest) {
        if !self.images.allows_collab(&spawn.image) {
            return;
        }
        if spawn.groups.contains(COLLABORATIVE_GROUP) {
            info!(user = %spawn.username, "Enabling real-time collaboration");
            spawn.append_args_if_absent(COLLAB_ENABLE_ARGS);
        } else {
            info!(user = %spawn.username, "Disabling real-time collaboration");
            spawn.append_args_if_absent(COLLAB_DISABLE_ARGS);
        }
    }
}

impl<D, S> PreSpawnHook for Provisioner<D, S>
where
    D: DirectorySource,
    S: IdentityStore,
{
    fn pre_spawn(&self, spawn: &mut SpawnRequest) -> HookResult<()> {
        self.apply_identity(spawn)?;
        self.apply_ai(spawn);
        self.apply_collaboration(spawn);
        Ok(())
    }
}

fn set_identity(spawn: &mut SpawnRequest, uid: u32, gid: u32, user: &str, group: &str) {
    // the container starts as root and drops to NB_USER after fixing ownership
    spawn.container_user = Some("root".into());
    spawn.working_dir = Some(format!("/home/{user}"));
    spawn.set_env("CHOWN_HOME", "no");
    spawn.set_env("CHOWN_HOME_OPTS", "");
    spawn.set_env("NB_UID", uid.to_string());
    spawn.set_env("NB_GID", gid.to_string());
    spawn.set_env("NB_USER", user);
    spawn.set_env("NB_GROUP", group);
}

fn apply_record(spawn: &mut SpawnRequest, record: &IdentityRecord) {
    set_identity(
        spawn,
        record.numeric_uid,
        record.numeric_gid,
        &record.username,
        &record.group_name,
    );
    spawn.set_env("GIT_AUTHOR_NAME", record.display_name.clone());
    spawn.set_env("GIT_COMMITTER_NAME", record.display_name.clone());
    if let Some(email) = &record.email {
        spawn.set_env("GIT_AUTHOR_EMAIL", email.clone());
        spawn.set_env("GIT_COMMITTER_EMAIL", email.clone());
    }
}
