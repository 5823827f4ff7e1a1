//! Local cache of resolved identities for hubident.
//!
//! Identity records are kept in a single SQLite table keyed by username so
//! that session starts do not need a directory round-trip, and keep working
//! while the directory is down.
//!
//! The [`IdentityStore`] trait is what the resolver depends on;
//! [`IdentityCache`] is the SQLite implementation.

mod cache;
mod config;
mod error;
mod store;

pub use cache::IdentityCache;
pub use config::{validate_table_name, CacheConfig, CacheLocation, DEFAULT_CACHE_PATH, DEFAULT_TABLE};
pub use error::{CacheError, CacheResult};
pub use store::IdentityStore;
