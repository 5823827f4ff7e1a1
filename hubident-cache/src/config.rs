//! Where the cache lives.

use crate::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CACHE_PATH: &str = "/tmp/ad_cache.sqlite3";
pub const DEFAULT_TABLE: &str = "ad_cache";

/// Cache file and table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub location: CacheLocation,
    #[serde(default = "default_table")]
    pub table: String,
}

/// Backing store for the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLocation {
    File(PathBuf),
    /// Private in-memory database; gone once disconnected.
    Memory,
}

impl Default for CacheLocation {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_CACHE_PATH))
    }
}

impl CacheLocation {
    /// `:memory:` maps to an in-memory store, anything else to a file.
    pub fn from_connect_string(s: &str) -> Self {
        if s.trim() == ":memory:" {
            Self::Memory
        } else {
            Self::File(PathBuf::from(s.trim()))
        }
    }
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: CacheLocation::default(),
            table: default_table(),
        }
    }
}

impl CacheConfig {
    pub fn new(location: CacheLocation, table: impl Into<String>) -> Self {
        Self {
            location,
            table: table.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(CacheLocation::Memory, DEFAULT_TABLE)
    }

    pub fn validate(&self) -> CacheResult<()> {
        validate_table_name(&self.table)?;
        if let CacheLocation::File(path) = &self.location {
            if path.as_os_str().is_empty() {
                return Err(CacheError::Config("cache path is empty".into()));
            }
        }
        Ok(())
    }
}

/// Table names are spliced into SQL, so only plain identifiers are allowed.
pub fn validate_table_name(name: &str) -> CacheResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CacheError::Config(format!("invalid table name: {name:?}")))
    }
}
