//! `ldap3`-backed directory client.

use std::sync::Arc;

use hubident_types::{IdentityRecord, SecurityId};
use ldap3::{LdapConn, LdapConnSettings, Scope, SearchEntry};
use tracing::{debug, info, instrument, warn};

use crate::client::{DirectoryClient, DirectorySource, RecordStream};
use crate::config::{DirectoryConnectionConfig, SearchScope};
use crate::{DirectoryError, DirectoryResult};

/// Factory for LDAP sessions sharing one configuration.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    config: Arc<DirectoryConnectionConfig>,
}

impl LdapDirectory {
    /// Validates the configuration and wraps it for sharing.
    ///
    /// Missing bind credentials are not checked here; they surface as a
    /// config error on the first `connect`.
    pub fn new(config: DirectoryConnectionConfig) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &DirectoryConnectionConfig {
        &self.config
    }
}

impl DirectorySource for LdapDirectory {
    type Client = LdapSession;

    fn session(&self) -> LdapSession {
        LdapSession {
            config: Arc::clone(&self.config),
            conn: None,
        }
    }
}

/// A single, lazily bound LDAP connection.
///
/// Unbinds when dropped.
pub struct LdapSession {
    config: Arc<DirectoryConnectionConfig>,
    conn: Option<LdapConn>,
}

impl LdapSession {
    fn search(&mut self, base: &str, filter: &str) -> DirectoryResult<Vec<SearchEntry>> {
        self.connect()?;
        let config = Arc::clone(&self.config);
        let Some(conn) = self.conn.as_mut() else {
            return Err(DirectoryError::Connection("not connected".into()));
        };

        let scope = match config.scope {
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        };

        debug!(base = %base, filter = %filter, ?scope, "Searching directory");

        let (entries, _) = conn
            .with_timeout(config.operation_timeout())
            .search(base, scope, filter, config.requested_attributes())
            .and_then(|res| res.success())
            .map_err(|e| DirectoryError::Query(format!("search under {base} failed: {e}")))?;

        Ok(entries.into_iter().map(SearchEntry::construct).collect())
    }
}

impl DirectoryClient for LdapSession {
    fn connect(&mut self) -> DirectoryResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let (bind_dn, password) = self.config.credentials()?;
        let url = self.config.server_url();

        debug!(url = %url, "Connecting to directory");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.config.connect_timeout())
            .set_starttls(self.config.starttls);

        let mut conn = LdapConn::with_settings(settings, &url)
            .map_err(|e| DirectoryError::Connection(format!("failed to connect to {url}: {e}")))?;

        conn.with_timeout(self.config.operation_timeout())
            .simple_bind(bind_dn, password)
            .and_then(|res| res.success())
            .map_err(|e| DirectoryError::Connection(format!("bind as {bind_dn} rejected: {e}")))?;

        info!(host = %self.config.host, "Directory connection established");
        self.conn = Some(conn);
        Ok(())
    }

    fn disconnect(&mut self) -> DirectoryResult<()> {
        if let Some(mut conn) = self.conn.take() {
            conn.unbind()
                .map_err(|e| DirectoryError::Connection(format!("unbind failed: {e}")))?;
            debug!(host = %self.config.host, "Directory connection released");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    #[instrument(skip(self))]
    fn lookup_by_username(&mut self, username: &str) -> DirectoryResult<Option<IdentityRecord>> {
        let base = self.config.user_base_dn();
        let filter = self.config.user_filter_for(username);
        let entries = self.search(&base, &filter)?;

        let Some(entry) = entries.first() else {
            debug!("No directory entry");
            return Ok(None);
        };
        if entries.len() > 1 {
            warn!(matches = entries.len(), "Several entries matched, using the first");
        }

        record_from_entry(entry, Some(username), &self.config).map(Some)
    }

    fn lookup_all(&mut self) -> DirectoryResult<RecordStream<'_>> {
        let base = self.config.user_base_dn();
        let filter = self.config.all_users_filter();
        let entries = self.search(&base, &filter)?;

        info!(entries = entries.len(), "Fetched directory entries");

        Ok(Box::new(records_from_entries(entries, &self.config)))
    }
}

impl Drop for LdapSession {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            debug!(error = %e, "Error during directory unbind");
        }
    }
}

impl std::fmt::Debug for LdapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSession")
            .field("host", &self.config.host)
            .field("connected", &self.conn.is_some())
            .finish()
    }
}

/// Maps a full listing into records, skipping entries that cannot form an
/// identity (no username, no usable SID, uid out of range).
pub fn records_from_entries(
    entries: Vec<SearchEntry>,
    config: &DirectoryConnectionConfig,
) -> impl Iterator<Item = DirectoryResult<IdentityRecord>> + '_ {
    entries.into_iter().filter_map(move |entry| {
        match record_from_entry(&entry, None, config) {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                warn!(error = %e, "Skipping directory entry");
                None
            }
        }
    })
}

/// Maps a search entry into an identity record.
///
/// The configured username attribute names the record, so a point lookup on
/// a case-insensitive directory keys on the directory's spelling. `username`
/// is only used when the entry does not carry that attribute.
pub fn record_from_entry(
    entry: &SearchEntry,
    username: Option<&str>,
    config: &DirectoryConnectionConfig,
) -> DirectoryResult<IdentityRecord> {
    let invalid = |reason: String| DirectoryError::InvalidEntry {
        dn: entry.dn.clone(),
        reason,
    };

    let username = first_value(entry, &config.username_attribute)
        .or_else(|| username.map(str::to_string))
        .ok_or_else(|| invalid(format!("missing {}", config.username_attribute)))?;

    let sid = security_id(entry, &config.attributes.security_id)
        .ok_or_else(|| invalid(format!("missing or malformed {}", config.attributes.security_id)))?;

    let display_name =
        first_value(entry, &config.attributes.display_name).unwrap_or_else(|| username.clone());
    let email = first_value(entry, &config.attributes.email);

    IdentityRecord::from_directory(
        username,
        display_name,
        sid,
        entry.dn.clone(),
        email,
        config.base_uid,
    )
    .map_err(|e| invalid(e.to_string()))
}

/// Attribute names are case-insensitive in LDAP.
fn first_value(entry: &SearchEntry, attribute: &str) -> Option<String> {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .and_then(|(_, values)| values.first())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_binary<'a>(entry: &'a SearchEntry, attribute: &str) -> Option<&'a [u8]> {
    entry
        .bin_attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .and_then(|(_, values)| values.first())
        .map(Vec::as_slice)
}

/// Text SIDs (OpenLDAP schemas, test directories) come back as strings;
/// Active Directory sends the binary form, which lands in `bin_attrs` unless
/// it happens to be valid UTF-8.
fn security_id(entry: &SearchEntry, attribute: &str) -> Option<SecurityId> {
    if let Some(raw) = entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .and_then(|(_, values)| values.first())
    {
        return SecurityId::parse(raw)
            .or_else(|_| SecurityId::from_bytes(raw.as_bytes()))
            .ok();
    }
    first_binary(entry, attribute).and_then(|bytes| SecurityId::from_bytes(bytes).ok())
}
