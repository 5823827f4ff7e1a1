use std::sync::{PoisonError, RwLock};

use hubident_cache::IdentityStore;
use hubident_directory::{DirectoryClient, DirectoryResult, DirectorySource};
use hubident_types::IdentityRecord;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{CachePolicy, ResolveResult};

/// Outcome of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The identity to provision with, overrides applied.
    Resolved(IdentityRecord),
    /// The allow-list excludes this username.
    Rejected,
    /// The directory has no such account.
    NotFound,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn into_record(self) -> Option<IdentityRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Rejected | Self::NotFound => None,
        }
    }
}

/// Counts from a full directory-to-cache sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub stored: usize,
}

/// Turns usernames into identity records: allow-list, then cache, then
/// directory with write-back, then policy overrides.
///
/// Safe to share across threads. Every directory lookup runs on its own
/// session; `sync_all` excludes concurrent resolutions on this resolver.
pub struct IdentityResolver<D, S> {
    directory: D,
    store: S,
    policy: CachePolicy,
    maintenance: RwLock<()>,
}

impl<D, S> IdentityResolver<D, S>
where
    D: DirectorySource,
    S: IdentityStore,
{
    pub fn new(directory: D, store: S, policy: CachePolicy) -> Self {
        Self {
            directory,
            store,
            policy,
            maintenance: RwLock::new(()),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves `username` to the identity to provision with.
    ///
    /// Cache read and directory failures are returned as errors. A failed
    /// cache write-back is logged and the directory record is still returned.
    #[instrument(skip(self))]
    pub fn resolve(&self, username: &str) -> ResolveResult<Resolution> {
        if !self.policy.is_allowed(username) {
            info!("Username not in allow-list");
            return Ok(Resolution::Rejected);
        }

        let _shared = self
            .maintenance
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut record = match self.store.get_by_username(username)? {
            Some(record) => {
                debug!("Cache hit");
                record
            }
            None => {
                debug!("Cache miss, querying directory");
                let Some(record) = self.lookup(username)? else {
                    info!("User not found in directory");
                    return Ok(Resolution::NotFound);
                };
                if let Err(e) = self.store.insert(&record) {
                    warn!(error = %e, "Failed to cache identity, continuing uncached");
                }
                record
            }
        };

        self.policy.apply(&mut record);
        Ok(Resolution::Resolved(record))
    }

    /// Replaces the cache with every account the directory returns.
    ///
    /// The full result set is fetched before the cache is touched, so a
    /// failure partway through leaves the previous contents in place.
    #[instrument(skip(self))]
    pub fn sync_all(&self) -> ResolveResult<SyncReport> {
        let _exclusive = self
            .maintenance
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut session = self.directory.session();
        let fetched = fetch_all(&mut session);
        close(&mut session);
        let records = fetched?;

        let stored = self.store.replace_all(&records)?;
        let report = SyncReport {
            fetched: records.len(),
            stored,
        };
        info!(fetched = report.fetched, stored = report.stored, "Directory sync complete");
        Ok(report)
    }

    fn lookup(&self, username: &str) -> ResolveResult<Option<IdentityRecord>> {
        let mut session = self.directory.session();
        let found = session.lookup_by_username(username);
        close(&mut session);
        Ok(found?)
    }
}

fn fetch_all<C: DirectoryClient>(session: &mut C) -> DirectoryResult<Vec<IdentityRecord>> {
    session.connect()?;
    session.lookup_all()?.collect()
}

fn close<C: DirectoryClient>(session: &mut C) {
    if let Err(e) = session.disconnect() {
        warn!(error = %e, "Failed to close directory session");
    }
}

impl<D, S> std::fmt::Debug for IdentityResolver<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
