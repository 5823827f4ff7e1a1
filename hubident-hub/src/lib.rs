//! Notebook hub integration for hubident.
//!
//! Loads the platform config file, builds the resolver it describes and
//! exposes the [`PreSpawnHook`] the hub calls before each session starts.
//! Also carries the small helpers the hub's OIDC login uses to turn group
//! claims into hub groups.

mod config;
mod error;
pub mod groups;
mod hook;
mod images;
mod provision;

pub use config::{
    config_path, DirectorySection, ForceGidSection, HubConfig, HubProvisioner, HubResolver,
    LocalCacheSection, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};
pub use error::{ConfigError, ConfigResult, HookError, HookResult};
pub use hook::{PreSpawnHook, SpawnRequest};
pub use images::{ImageCatalog, ImageEntry};
pub use provision::{AiConfig, Provisioner, UserSource, COLLABORATIVE_GROUP};
