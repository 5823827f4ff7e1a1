//! Core type definitions for hubident.
//!
//! This crate defines the identity data model shared by the directory client,
//! the local cache and the resolver:
//! - [`SecurityId`]: the opaque directory account identifier and the
//!   relative identifier (RID) it ends with
//! - [`derive_uid`]: the stable RID-to-uid mapping
//! - [`IdentityRecord`]: one resolved user identity
//!
//! Nothing here talks to a directory or a database.

mod record;
mod sid;

pub use record::{ForcedGroup, IdentityRecord};
pub use sid::{derive_uid, SecurityId, DEFAULT_BASE_UID};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid security identifier: {0}")]
    InvalidSecurityId(String),

    #[error("uid overflow: base {base} + rid {rid} exceeds u32")]
    UidOverflow { base: u32, rid: u32 },
}
