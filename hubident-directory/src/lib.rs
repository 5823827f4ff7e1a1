//! Directory-service identity lookups for hubident.
//!
//! Connects to an LDAP directory (typically Active Directory), searches for
//! user accounts and maps their attributes into [`IdentityRecord`]s with a uid
//! derived from the account's security identifier.
//!
//! # Components
//!
//! - **Config**: [`DirectoryConnectionConfig`], immutable connection and query
//!   parameters
//! - **Client**: the [`DirectoryClient`] / [`DirectorySource`] seam the
//!   resolver is written against
//! - **LDAP**: [`LdapDirectory`] hands out [`LdapSession`]s, one bound
//!   connection each, built on `ldap3`
//!
//! # Example
//!
//! ```no_run
//! use hubident_directory::{DirectoryClient, DirectoryConnectionConfig, DirectorySource, LdapDirectory};
//!
//! let config = DirectoryConnectionConfig::new("dc01.example.org", "DC=example,DC=org")
//!     .with_credentials("CN=svc-hub,OU=Service,DC=example,DC=org", "secret")
//!     .with_user_search_rdn("OU=Staff")
//!     .with_username_attribute("sAMAccountName");
//!
//! let directory = LdapDirectory::new(config)?;
//! let mut session = directory.session();
//! let alice = session.lookup_by_username("alice")?;
//! session.disconnect()?;
//! # Ok::<(), hubident_directory::DirectoryError>(())
//! ```
//!
//! [`IdentityRecord`]: hubident_types::IdentityRecord

mod client;
mod config;
mod error;
pub mod filter;
mod ldap;

pub use client::{DirectoryClient, DirectorySource, RecordStream};
pub use config::{AttributeNames, DirectoryConnectionConfig, SearchScope};
pub use error::{DirectoryError, DirectoryResult};
pub use ldap::{record_from_entry, records_from_entries, LdapDirectory, LdapSession};
