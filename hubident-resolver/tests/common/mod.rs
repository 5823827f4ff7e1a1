#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use hubident_cache::{CacheError, CacheResult, IdentityCache, IdentityStore};
use hubident_directory::{
    DirectoryClient, DirectoryError, DirectoryResult, DirectorySource, RecordStream,
};
use hubident_types::{IdentityRecord, SecurityId};

pub const BASE_UID: u32 = 1_615_200_000;

pub fn record(username: &str, rid: u32) -> IdentityRecord {
    IdentityRecord::from_directory(
        username,
        format!("{username} display"),
        SecurityId::parse(&format!("S-1-5-21-1004336348-1177238915-682003330-{rid}")).unwrap(),
        format!("cn={username},ou=people,dc=example,dc=org"),
        Some(format!("{username}@example.org")),
        BASE_UID,
    )
    .unwrap()
}

#[derive(Default)]
struct DirectoryState {
    records: Vec<IdentityRecord>,
    fail_after: Option<usize>,
    unreachable: AtomicBool,
    sessions: AtomicUsize,
    lookups: AtomicUsize,
    full_scans: AtomicUsize,
    open_sessions: AtomicUsize,
}

/// In-memory directory that counts every call made against it.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<DirectoryState>,
}

impl FakeDirectory {
    pub fn with_records(records: Vec<IdentityRecord>) -> Self {
        Self {
            state: Arc::new(DirectoryState {
                records,
                ..Default::default()
            }),
        }
    }

    /// `lookup_all` yields this many records and then a query error.
    pub fn failing_after(records: Vec<IdentityRecord>, n: usize) -> Self {
        Self {
            state: Arc::new(DirectoryState {
                records,
                fail_after: Some(n),
                ..Default::default()
            }),
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn sessions(&self) -> usize {
        self.state.sessions.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.state.lookups.load(Ordering::SeqCst)
    }

    pub fn full_scans(&self) -> usize {
        self.state.full_scans.load(Ordering::SeqCst)
    }

    /// Sessions connected and not yet disconnected.
    pub fn open_sessions(&self) -> usize {
        self.state.open_sessions.load(Ordering::SeqCst)
    }
}

impl DirectorySource for FakeDirectory {
    type Client = FakeSession;

    fn session(&self) -> FakeSession {
        self.state.sessions.fetch_add(1, Ordering::SeqCst);
        FakeSession {
            state: Arc::clone(&self.state),
            connected: false,
        }
    }
}

pub struct FakeSession {
    state: Arc<DirectoryState>,
    connected: bool,
}

impl DirectoryClient for FakeSession {
    fn connect(&mut self) -> DirectoryResult<()> {
        if self.connected {
            return Ok(());
        }
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Connection("directory unreachable".into()));
        }
        self.connected = true;
        self.state.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&mut self) -> DirectoryResult<()> {
        if self.connected {
            self.connected = false;
            self.state.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn lookup_by_username(&mut self, username: &str) -> DirectoryResult<Option<IdentityRecord>> {
        self.state.lookups.fetch_add(1, Ordering::SeqCst);
        self.connect()?;
        Ok(self
            .state
            .records
            .iter()
            .find(|r| r.username == username)
            .cloned())
    }

    fn lookup_all(&mut self) -> DirectoryResult<RecordStream<'_>> {
        self.state.full_scans.fetch_add(1, Ordering::SeqCst);
        self.connect()?;
        let records = self.state.records.iter().cloned().map(Ok);
        match self.state.fail_after {
            Some(n) => Ok(Box::new(records.take(n).chain(std::iter::once(Err(
                DirectoryError::Query("connection reset during search".into()),
            ))))),
            None => Ok(Box::new(records)),
        }
    }
}

/// Wraps a real cache and counts calls; inserts can be made to fail.
pub struct CountingStore {
    inner: IdentityCache,
    pub gets: AtomicUsize,
    pub inserts: AtomicUsize,
    pub replaces: AtomicUsize,
    fail_inserts: AtomicBool,
}

impl CountingStore {
    pub fn new(inner: IdentityCache) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
            replaces: AtomicUsize::new(0),
            fail_inserts: AtomicBool::new(false),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IdentityCache::open_in_memory().unwrap())
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &IdentityCache {
        &self.inner
    }
}

impl IdentityStore for CountingStore {
    fn get_by_username(&self, username: &str) -> CacheResult<Option<IdentityRecord>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_username(username)
    }

    fn insert(&self, record: &IdentityRecord) -> CacheResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("disk full".into()));
        }
        self.inner.insert(record)
    }

    fn replace_all(&self, records: &[IdentityRecord]) -> CacheResult<usize> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_all(records)
    }

    fn get_all(&self) -> CacheResult<Vec<IdentityRecord>> {
        self.inner.get_all()
    }

    fn count(&self) -> CacheResult<usize> {
        self.inner.count()
    }
}
