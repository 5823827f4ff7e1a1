use crate::DirectoryResult;
use hubident_types::IdentityRecord;

/// Lazily produced, finite, non-restartable sequence of records.
pub type RecordStream<'a> = Box<dyn Iterator<Item = DirectoryResult<IdentityRecord>> + 'a>;

/// One connection's worth of directory access.
///
/// `connect` and `disconnect` are idempotent. Lookups connect on demand.
pub trait DirectoryClient {
    /// Establishes a bound connection if there is none yet.
    fn connect(&mut self) -> DirectoryResult<()>;

    /// Releases the connection. A no-op when already disconnected.
    fn disconnect(&mut self) -> DirectoryResult<()>;

    fn is_connected(&self) -> bool;

    /// Looks up one account by login name. `Ok(None)` means the directory
    /// has no such user.
    fn lookup_by_username(&mut self, username: &str) -> DirectoryResult<Option<IdentityRecord>>;

    /// Streams every account matched by the configured user filter.
    fn lookup_all(&mut self) -> DirectoryResult<RecordStream<'_>>;
}

/// Hands out fresh, unconnected clients.
///
/// Each resolution gets its own client, so no connection state is shared
/// between concurrent callers.
pub trait DirectorySource: Send + Sync {
    type Client: DirectoryClient;

    fn session(&self) -> Self::Client;
}
