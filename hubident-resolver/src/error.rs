use hubident_cache::CacheError;
use hubident_directory::DirectoryError;
use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// A resolution or sync that could not complete.
///
/// Unknown and disallowed users are not errors; see [`crate::Resolution`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
