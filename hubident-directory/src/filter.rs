//! LDAP filter and DN string construction.
//!
//! Values are escaped (RFC 4515 for filters, RFC 4514 for DNs) so a login
//! name can never change the shape of a query.

use ldap3::{dn_escape, ldap_escape};

/// `(attr=value)` with the value escaped.
pub fn equality(attribute: &str, value: &str) -> String {
    format!("({}={})", attribute, ldap_escape(value))
}

/// Trims a configured filter and wraps it in parentheses if needed.
/// Returns `None` for a blank filter.
pub fn normalize(filter: &str) -> Option<String> {
    let filter = filter.trim();
    if filter.is_empty() {
        None
    } else if filter.starts_with('(') && filter.ends_with(')') {
        Some(filter.to_string())
    } else {
        Some(format!("({filter})"))
    }
}

/// `(&clause base)`, or just `clause` when the base filter is blank.
pub fn and(clause: String, base: &str) -> String {
    match normalize(base) {
        Some(base) => format!("(&{clause}{base})"),
        None => clause,
    }
}

/// `attr=value,parent` with the value escaped.
pub fn child_dn(attribute: &str, value: &str, parent: &str) -> String {
    format!("{}={},{}", attribute, dn_escape(value), parent)
}
