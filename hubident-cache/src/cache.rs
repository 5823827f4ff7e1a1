//! SQLite-backed identity cache.

use std::sync::{Mutex, MutexGuard, PoisonError};

use hubident_types::{IdentityRecord, SecurityId};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Statement};
use tracing::{debug, info};

use crate::config::{CacheConfig, CacheLocation};
use crate::store::IdentityStore;
use crate::{CacheError, CacheResult};

const COLUMNS: &str = "username, group_name, display_name, uid, gid, sid, dn, mail";

/// Identity cache over a single SQLite table.
///
/// The connection is opened on `connect` or on first use and shared behind a
/// mutex, so concurrent callers are serialized.
pub struct IdentityCache {
    config: CacheConfig,
    conn: Mutex<Option<Connection>>,
}

impl IdentityCache {
    /// Creates an unconnected cache after validating the config.
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            conn: Mutex::new(None),
        })
    }

    /// Creates the cache and connects immediately.
    pub fn open(config: CacheConfig) -> CacheResult<Self> {
        let cache = Self::new(config)?;
        cache.connect()?;
        Ok(cache)
    }

    /// Opens an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        Self::open(CacheConfig::in_memory())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Opens the store and creates the table if absent. A no-op when already
    /// connected.
    pub fn connect(&self) -> CacheResult<()> {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(self.open_connection()?);
        }
        Ok(())
    }

    /// Closes the store. A no-op when already disconnected.
    pub fn disconnect(&self) -> CacheResult<()> {
        if let Some(conn) = self.lock().take() {
            conn.close().map_err(|(_, e)| CacheError::Database(e))?;
            debug!(table = %self.config.table, "Cache connection closed");
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Drops and recreates the table, discarding every record.
    pub fn drop_table(&self) -> CacheResult<()> {
        let table = &self.config.table;
        self.with_conn(|conn| {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
            create_table(conn, table)?;
            info!(table = %table, "Cache table reset");
            Ok(())
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_connection(&self) -> CacheResult<Connection> {
        let conn = match &self.config.location {
            CacheLocation::Memory => Connection::open_in_memory().map_err(|e| {
                CacheError::Connection(format!("failed to open in-memory cache: {e}"))
            })?,
            CacheLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        CacheError::Connection(format!(
                            "failed to create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                Connection::open(path).map_err(|e| {
                    CacheError::Connection(format!("failed to open {}: {e}", path.display()))
                })?
            }
        };
        create_table(&conn, &self.config.table)?;
        debug!(table = %self.config.table, "Cache connection opened");
        Ok(conn)
    }

    /// Runs `f` against the connection, connecting first if needed.
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> CacheResult<T>) -> CacheResult<T> {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(self.open_connection()?);
        }
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(CacheError::Connection("cache is not connected".into())),
        }
    }
}

impl IdentityStore for IdentityCache {
    fn get_by_username(&self, username: &str) -> CacheResult<Option<IdentityRecord>> {
        let table = &self.config.table;
        let row = self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM {table} WHERE username = ?1"),
                params![username],
                read_row,
            )
            .optional()
            .map_err(CacheError::from)
        })?;
        row.map(into_record).transpose()
    }

    fn insert(&self, record: &IdentityRecord) -> CacheResult<()> {
        let table = &self.config.table;
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&insert_sql(table))?;
            insert_row(&mut stmt, record)?;
            debug!(username = %record.username, "Cached identity");
            Ok(())
        })
    }

    fn replace_all(&self, records: &[IdentityRecord]) -> CacheResult<usize> {
        let table = &self.config.table;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
            create_table(&tx, table)?;
            {
                let mut stmt = tx.prepare(&insert_sql(table))?;
                for record in records {
                    insert_row(&mut stmt, record)?;
                }
            }
            tx.commit()?;
            info!(table = %table, records = records.len(), "Cache contents replaced");
            Ok(records.len())
        })
    }

    fn get_all(&self) -> CacheResult<Vec<IdentityRecord>> {
        let table = &self.config.table;
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM {table} ORDER BY id"))?;
            let rows = stmt
                .query_map([], read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        rows.into_iter().map(into_record).collect()
    }

    fn count(&self) -> CacheResult<usize> {
        let table = &self.config.table;
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn create_table(conn: &Connection, table: &str) -> CacheResult<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            group_name TEXT NOT NULL,
            display_name TEXT NOT NULL,
            uid INTEGER NOT NULL,
            gid INTEGER NOT NULL,
            sid TEXT NOT NULL,
            dn TEXT NOT NULL,
            mail TEXT
        );
        "
    ))?;
    Ok(())
}

type Row = (String, String, String, i64, i64, String, String, Option<String>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_record(row: Row) -> CacheResult<IdentityRecord> {
    let (username, group_name, display_name, uid, gid, sid, dn, mail) = row;
    let numeric_uid = u32::try_from(uid)
        .map_err(|_| CacheError::InvalidData(format!("uid {uid} out of range for {username}")))?;
    let numeric_gid = u32::try_from(gid)
        .map_err(|_| CacheError::InvalidData(format!("gid {gid} out of range for {username}")))?;
    let security_id = SecurityId::parse(&sid)
        .map_err(|e| CacheError::InvalidData(format!("{e} for {username}")))?;

    Ok(IdentityRecord {
        username,
        display_name,
        numeric_uid,
        numeric_gid,
        group_name,
        security_id,
        distinguished_name: dn,
        email: mail,
        groups: Vec::new(),
    })
}

fn insert_sql(table: &str) -> String {
    format!("INSERT INTO {table} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)")
}

fn insert_row(stmt: &mut Statement<'_>, record: &IdentityRecord) -> CacheResult<()> {
    stmt.execute(params![
        record.username,
        record.group_name,
        record.display_name,
        i64::from(record.numeric_uid),
        i64::from(record.numeric_gid),
        record.security_id.as_str(),
        record.distinguished_name,
        record.email,
    ])
    .map_err(|e| map_insert_error(e, &record.username))?;
    Ok(())
}

fn map_insert_error(e: rusqlite::Error, username: &str) -> CacheError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            CacheError::DuplicateKey(username.to_string())
        }
        other => CacheError::Database(other),
    }
}
