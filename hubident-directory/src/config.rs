//! Directory connection configuration.

use crate::filter;
use crate::{DirectoryError, DirectoryResult};
use hubident_types::DEFAULT_BASE_UID;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable connection and query parameters for one directory.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConnectionConfig {
    /// Server hostname or IP address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect with LDAPS.
    #[serde(default)]
    pub tls: bool,

    /// Upgrade a plain connection with STARTTLS.
    #[serde(default)]
    pub starttls: bool,

    /// DN used for the simple bind.
    #[serde(default)]
    pub bind_dn: Option<String>,

    /// Bind password. Never serialized.
    #[serde(default, skip_serializing)]
    pub bind_password: Option<String>,

    /// Search base (e.g. "DC=example,DC=org").
    pub base_dn: String,

    /// User container relative to `base_dn` (e.g. "OU=Staff").
    #[serde(default)]
    pub user_search_rdn: Option<String>,

    /// Group container relative to `base_dn`.
    #[serde(default)]
    pub group_search_rdn: Option<String>,

    /// Filter every user search is restricted by.
    #[serde(default = "default_filter")]
    pub user_filter: String,

    /// Filter every group search is restricted by.
    #[serde(default = "default_filter")]
    pub group_filter: String,

    /// Attribute holding the login name.
    #[serde(default = "default_username_attribute")]
    pub username_attribute: String,

    /// Attribute naming a group.
    #[serde(default = "default_groupname_attribute")]
    pub groupname_attribute: String,

    #[serde(default)]
    pub scope: SearchScope,

    #[serde(default)]
    pub attributes: AttributeNames,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,

    /// Offset added to the RID to form a uid.
    #[serde(default = "default_base_uid")]
    pub base_uid: u32,
}

/// How deep below the search base lookups go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Direct children of the base only.
    #[default]
    OneLevel,
    /// The whole subtree.
    Subtree,
}

/// Names of the account attributes read from each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNames {
    #[serde(default = "default_sid_attribute")]
    pub security_id: String,
    #[serde(default = "default_display_name_attribute")]
    pub display_name: String,
    #[serde(default = "default_email_attribute")]
    pub email: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            security_id: default_sid_attribute(),
            display_name: default_display_name_attribute(),
            email: default_email_attribute(),
        }
    }
}

impl std::fmt::Debug for DirectoryConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("starttls", &self.starttls)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("base_dn", &self.base_dn)
            .field("user_search_rdn", &self.user_search_rdn)
            .field("group_search_rdn", &self.group_search_rdn)
            .field("user_filter", &self.user_filter)
            .field("group_filter", &self.group_filter)
            .field("username_attribute", &self.username_attribute)
            .field("groupname_attribute", &self.groupname_attribute)
            .field("scope", &self.scope)
            .field("attributes", &self.attributes)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .field("base_uid", &self.base_uid)
            .finish()
    }
}

fn default_host() -> String {
    "openldap".to_string()
}

fn default_port() -> u16 {
    389
}

fn default_filter() -> String {
    "(cn=*)".to_string()
}

fn default_username_attribute() -> String {
    "uid".to_string()
}

fn default_groupname_attribute() -> String {
    "ou".to_string()
}

fn default_sid_attribute() -> String {
    "objectSid".to_string()
}

fn default_display_name_attribute() -> String {
    "cn".to_string()
}

fn default_email_attribute() -> String {
    "mail".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_operation_timeout_secs() -> u64 {
    30
}

fn default_base_uid() -> u32 {
    DEFAULT_BASE_UID
}

impl DirectoryConnectionConfig {
    /// Creates a config with the required fields and defaults for the rest.
    pub fn new(host: impl Into<String>, base_dn: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            tls: false,
            starttls: false,
            bind_dn: None,
            bind_password: None,
            base_dn: base_dn.into(),
            user_search_rdn: None,
            group_search_rdn: None,
            user_filter: default_filter(),
            group_filter: default_filter(),
            username_attribute: default_username_attribute(),
            groupname_attribute: default_groupname_attribute(),
            scope: SearchScope::default(),
            attributes: AttributeNames::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            operation_timeout_secs: default_operation_timeout_secs(),
            base_uid: default_base_uid(),
        }
    }

    pub fn with_credentials(
        mut self,
        bind_dn: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.bind_dn = Some(bind_dn.into());
        self.bind_password = Some(password.into());
        self
    }

    /// Enable LDAPS on port 636.
    #[must_use]
    pub fn with_tls(mut self) -> Self {
        self.tls = true;
        self.port = 636;
        self
    }

    pub fn with_user_search_rdn(mut self, rdn: impl Into<String>) -> Self {
        self.user_search_rdn = Some(rdn.into());
        self
    }

    pub fn with_user_filter(mut self, filter: impl Into<String>) -> Self {
        self.user_filter = filter.into();
        self
    }

    pub fn with_username_attribute(mut self, attr: impl Into<String>) -> Self {
        self.username_attribute = attr.into();
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_base_uid(mut self, base_uid: u32) -> Self {
        self.base_uid = base_uid;
        self
    }

    /// Checks the fields that must be present before anything else happens.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.host.trim().is_empty() {
            return Err(DirectoryError::Config("host is required".into()));
        }
        if self.base_dn.trim().is_empty() {
            return Err(DirectoryError::Config("base_dn is required".into()));
        }
        if self.username_attribute.trim().is_empty() {
            return Err(DirectoryError::Config(
                "username_attribute is required".into(),
            ));
        }
        Ok(())
    }

    /// Bind DN and password, or a config error naming the missing one.
    pub fn credentials(&self) -> DirectoryResult<(&str, &str)> {
        let bind_dn = self
            .bind_dn
            .as_deref()
            .ok_or_else(|| DirectoryError::Config("bind_dn is not set".into()))?;
        let password = self
            .bind_password
            .as_deref()
            .ok_or_else(|| DirectoryError::Config("bind_password is not set".into()))?;
        Ok((bind_dn, password))
    }

    /// `ldap://host:port` or `ldaps://host:port`.
    #[must_use]
    pub fn server_url(&self) -> String {
        let proto = if self.tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", proto, self.host, self.port)
    }

    /// Full DN of the user container.
    #[must_use]
    pub fn user_base_dn(&self) -> String {
        self.dn_by_rdn(self.user_search_rdn.as_deref())
    }

    /// Full DN of the group container.
    #[must_use]
    pub fn group_base_dn(&self) -> String {
        self.dn_by_rdn(self.group_search_rdn.as_deref())
    }

    fn dn_by_rdn(&self, rdn: Option<&str>) -> String {
        match rdn.map(str::trim) {
            Some(rdn) if !rdn.is_empty() => format!("{},{}", rdn, self.base_dn),
            _ => self.base_dn.clone(),
        }
    }

    /// Filter selecting one user: the username clause AND the user filter.
    #[must_use]
    pub fn user_filter_for(&self, username: &str) -> String {
        filter::and(
            filter::equality(&self.username_attribute, username),
            &self.user_filter,
        )
    }

    /// Filter selecting one group: the group-name clause AND the group filter.
    #[must_use]
    pub fn group_filter_for(&self, groupname: &str) -> String {
        filter::and(
            filter::equality(&self.groupname_attribute, groupname),
            &self.group_filter,
        )
    }

    /// Filter selecting every user, for full synchronization.
    #[must_use]
    pub fn all_users_filter(&self) -> String {
        filter::normalize(&self.user_filter)
            .unwrap_or_else(|| format!("({}=*)", self.username_attribute))
    }

    /// DN of a user placed directly under the user container.
    #[must_use]
    pub fn user_dn(&self, username: &str) -> String {
        filter::child_dn(&self.username_attribute, username, &self.user_base_dn())
    }

    /// DN of a group placed directly under the group container.
    #[must_use]
    pub fn group_dn(&self, groupname: &str) -> String {
        filter::child_dn(&self.groupname_attribute, groupname, &self.group_base_dn())
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Attributes requested on every user search.
    pub(crate) fn requested_attributes(&self) -> Vec<&str> {
        vec![
            self.attributes.security_id.as_str(),
            self.attributes.display_name.as_str(),
            self.attributes.email.as_str(),
            self.username_attribute.as_str(),
        ]
    }
}
