use crate::CacheResult;
use hubident_types::IdentityRecord;

/// Key-value store of identity records keyed by username.
pub trait IdentityStore: Send + Sync {
    /// Point lookup. No directory fallback.
    fn get_by_username(&self, username: &str) -> CacheResult<Option<IdentityRecord>>;

    /// Adds a record. Fails with `DuplicateKey` if the username is present.
    fn insert(&self, record: &IdentityRecord) -> CacheResult<()>;

    /// Drops the current contents and stores `records` in their place, all
    /// or nothing.
    fn replace_all(&self, records: &[IdentityRecord]) -> CacheResult<usize>;

    /// Every cached record in insertion order.
    fn get_all(&self) -> CacheResult<Vec<IdentityRecord>>;

    fn count(&self) -> CacheResult<usize>;
}
