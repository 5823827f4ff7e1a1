//! Identity resolution for hubident.
//!
//! [`IdentityResolver`] answers "which uid, gid and names should this user's
//! session run as": it enforces the allow-list, serves cached identities,
//! falls back to the directory on a miss and applies the static overrides of
//! the [`CachePolicy`].

mod error;
mod policy;
mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use policy::CachePolicy;
pub use resolver::{IdentityResolver, Resolution, SyncReport};
