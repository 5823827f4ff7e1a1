//! Platform config file.
//!
//! ```toml
//! allow_users = ["alice", "bob"]
//! append_groups = ["staff"]
//!
//! [directory]
//! enable = true
//! force_gid = { enable = true, gid = 100, name = "users" }
//!
//! [directory.config]
//! host = "dc01.example.org"
//! base_dn = "DC=example,DC=org"
//! bind_dn = "CN=svc-hub,OU=Service,DC=example,DC=org"
//! bind_password = "secret"
//! user_search_rdn = "OU=Staff"
//! username_attribute = "sAMAccountName"
//!
//! [local_cache]
//! enable = true
//! path = "/var/lib/hubident/cache.sqlite3"
//! table = "ad_cache"
//!
//! [user_update]
//! enable = true
//! from_directory = true
//!
//! [allowed_images]
//! minimal = "quay.io/jupyter/minimal-notebook:latest"
//! datascience = { image = "quay.io/jupyter/datascience-notebook:latest", allow_collab = false }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hubident_cache::{validate_table_name, CacheConfig, CacheLocation, IdentityCache, DEFAULT_TABLE};
use hubident_directory::{DirectoryConnectionConfig, LdapDirectory};
use hubident_resolver::{CachePolicy, IdentityResolver};
use hubident_types::ForcedGroup;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::images::ImageCatalog;
use crate::provision::{AiConfig, Provisioner, UserSource};
use crate::{ConfigError, ConfigResult};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/hubident/config.toml";
pub const CONFIG_PATH_ENV: &str = "HUBIDENT_CONFIG";

/// Resolver over the LDAP directory and the SQLite cache.
pub type HubResolver = IdentityResolver<LdapDirectory, IdentityCache>;

/// Hook over the LDAP directory and the SQLite cache.
pub type HubProvisioner = Provisioner<LdapDirectory, IdentityCache>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub directory: DirectorySection,
    #[serde(default)]
    pub local_cache: LocalCacheSection,
    /// Groups added to every directory identity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub append_groups: Vec<String>,
    /// When non-empty, the only users allowed to start sessions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_users: Vec<String>,
    #[serde(default)]
    pub user_update: UserSource,
    #[serde(default, skip_serializing_if = "ImageCatalog::is_empty")]
    pub allowed_images: ImageCatalog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySection {
    #[serde(default)]
    pub enable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DirectoryConnectionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_gid: Option<ForceGidSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceGidSection {
    #[serde(default)]
    pub enable: bool,
    pub gid: u32,
    pub name: String,
}

/// Disabled means the default location and table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalCacheSection {
    #[serde(default)]
    pub enable: bool,
    /// File path, or `:memory:`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// The path given on the command line, else `$HUBIDENT_CONFIG`, else the
/// default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl HubConfig {
    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(directory) = self.directory_config() {
            directory
                .validate()
                .and_then(|()| directory.credentials().map(|_| ()))
                .map_err(|e| ConfigError::Invalid(format!("directory: {e}")))?;
        } else if self.directory.enable {
            return Err(ConfigError::Invalid(
                "directory is enabled but [directory.config] is missing".into(),
            ));
        }

        if let Some(force) = self.forced_group() {
            if force.name.trim().is_empty() {
                return Err(ConfigError::Invalid("force_gid.name is empty".into()));
            }
        }

        if let Some(table) = self.local_cache.table.as_deref().filter(|_| self.local_cache.enable) {
            validate_table_name(table).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        if self.user_update.enable && self.user_update.from_directory && !self.directory.enable {
            return Err(ConfigError::Invalid(
                "user_update.from_directory requires an enabled directory".into(),
            ));
        }

        if let Some(ai) = self.ai.as_ref().filter(|ai| ai.enable) {
            if ai.name.trim().is_empty() {
                return Err(ConfigError::Invalid("ai.name is empty".into()));
            }
        }
        Ok(())
    }

    /// Connection settings, if the directory is enabled.
    pub fn directory_config(&self) -> Option<&DirectoryConnectionConfig> {
        if self.directory.enable {
            self.directory.config.as_ref()
        } else {
            None
        }
    }

    pub fn forced_group(&self) -> Option<ForcedGroup> {
        self.directory
            .force_gid
            .as_ref()
            .filter(|f| f.enable)
            .map(|f| ForcedGroup::new(f.gid, f.name.clone()))
    }

    pub fn cache_policy(&self) -> CachePolicy {
        let allow_list = (!self.allow_users.is_empty())
            .then(|| self.allow_users.iter().cloned().collect::<BTreeSet<_>>());
        CachePolicy {
            force_group: self.forced_group(),
            allow_list,
            append_groups: self.append_groups.clone(),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        if !self.local_cache.enable {
            return CacheConfig::default();
        }
        let location = self
            .local_cache
            .path
            .as_deref()
            .map(CacheLocation::from_connect_string)
            .unwrap_or_default();
        let table = self.local_cache.table.as_deref().unwrap_or(DEFAULT_TABLE);
        CacheConfig::new(location, table)
    }

    /// A resolver for the configured directory, or `None` when it is
    /// disabled.
    pub fn build_resolver(&self) -> ConfigResult<Option<HubResolver>> {
        let Some(directory) = self.directory_config() else {
            return Ok(None);
        };
        let directory = LdapDirectory::new(directory.clone())
            .map_err(|e| ConfigError::Invalid(format!("directory: {e}")))?;
        let cache = IdentityCache::new(self.cache_config())
            .map_err(|e| ConfigError::Invalid(format!("local_cache: {e}")))?;
        Ok(Some(IdentityResolver::new(directory, cache, self.cache_policy())))
    }

    pub fn build_provisioner(&self) -> ConfigResult<HubProvisioner> {
        Ok(Provisioner::new(self.build_resolver()?, self.user_update.clone())
            .with_ai(self.ai.clone())
            .with_images(self.allowed_images.clone()))
    }
}
