//! Directory access seam.
//!
//! The provisioning and administration workflows only ever talk to the
//! directory through [`DirectoryClient`]. [`DirectorySession`] backs it with
//! a live LDAP connection; [`InMemoryDirectory`] backs it with a map for tests
//! and the offline demo.

mod entry;
mod layout;
mod ldap;
mod memory;

use crate::workflows::provisioning::CandidateRecord;
use std::collections::BTreeMap;

pub use entry::{user_attributes, UserView, USER_DISPLAY_ATTRIBUTES, USER_OBJECT_CLASSES};
pub use layout::DirectoryLayout;
pub use ldap::{DirectorySession, LdapConnector};
pub use memory::InMemoryDirectory;

/// Search filter selecting provisioned user entries.
pub const USER_FILTER: &str = "(objectClass=inetOrgPerson)";

/// First value of each requested attribute, keyed by attribute name.
pub type AttributeMap = BTreeMap<String, String>;

/// Blocking, single-outcome directory operations used by the workflows.
pub trait DirectoryClient {
    /// Whether a user entry exists at `dn`. Lookup failures read as absent.
    fn exists(&mut self, dn: &str) -> bool;

    fn create(&mut self, record: &CandidateRecord, dn: &str) -> Result<(), DirectoryError>;

    fn delete(&mut self, dn: &str) -> Result<(), DirectoryError>;

    /// DNs of the user entries exactly one level below `base`.
    fn list_children(&mut self, base: &str) -> Result<Vec<String>, DirectoryError>;

    /// Returns `None` when no user entry exists at `dn`.
    fn fetch_attributes(
        &mut self,
        dn: &str,
        names: &[&str],
    ) -> Result<Option<AttributeMap>, DirectoryError>;
}

/// Opens a fresh [`DirectoryClient`] per unit of work.
pub trait DirectoryConnector: Send + Sync {
    fn open(&self) -> Result<Box<dyn DirectoryClient + Send>, DirectoryError>;
}

/// Failure reported by the directory or by the transport underneath it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("{reason} (result code {code})")]
    Rejected { code: u32, reason: String },
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    /// Builds a rejection whose reason is the standard description of `code`.
    pub fn rejected(code: u32) -> Self {
        let reason = match describe_result_code(code) {
            Some(description) => description.to_string(),
            None => format!("LDAP result code {code}"),
        };
        Self::Rejected { code, reason }
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::Unavailable(_) => None,
        }
    }

    /// Human-readable reason without the result code suffix.
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected { reason, .. } => reason,
            Self::Unavailable(message) => message,
        }
    }
}

pub(crate) const RESULT_NO_SUCH_OBJECT: u32 = 32;
pub(crate) const RESULT_INVALID_CREDENTIALS: u32 = 49;
pub(crate) const RESULT_ALREADY_EXISTS: u32 = 68;

/// Text for the LDAPv3 result codes (RFC 4511 §4.1.9) a provisioning run is
/// likely to meet.
pub fn describe_result_code(code: u32) -> Option<&'static str> {
    let description = match code {
        0 => "Success",
        1 => "Operations Error",
        2 => "Protocol Error",
        3 => "Time Limit Exceeded",
        4 => "Size Limit Exceeded",
        7 => "Auth Method Not Supported",
        8 => "Strong Auth Required",
        11 => "Admin Limit Exceeded",
        16 => "No Such Attribute",
        17 => "Undefined Attribute Type",
        18 => "Inappropriate Matching",
        19 => "Constraint Violation",
        20 => "Attribute Or Value Exists",
        21 => "Invalid Attribute Syntax",
        32 => "No Such Object",
        34 => "Invalid DN Syntax",
        48 => "Inappropriate Authentication",
        49 => "Invalid Credentials",
        50 => "Insufficient Access Rights",
        51 => "Busy",
        52 => "Unavailable",
        53 => "Unwilling To Perform",
        54 => "Loop Detect",
        64 => "Naming Violation",
        65 => "Object Class Violation",
        66 => "Not Allowed On Non-Leaf",
        67 => "Not Allowed On RDN",
        68 => "Already Exists",
        69 => "Object Class Mods Prohibited",
        80 => "Other",
        _ => return None,
    };
    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_uses_standard_description() {
        let err = DirectoryError::rejected(RESULT_ALREADY_EXISTS);
        assert_eq!(err.code(), Some(68));
        assert_eq!(err.reason(), "Already Exists");
        assert_eq!(err.to_string(), "Already Exists (result code 68)");
    }

    #[test]
    fn rejected_falls_back_for_unlisted_codes() {
        let err = DirectoryError::rejected(4096);
        assert_eq!(err.reason(), "LDAP result code 4096");
    }

    #[test]
    fn unavailable_has_no_code() {
        let err = DirectoryError::Unavailable("connection refused".to_string());
        assert_eq!(err.code(), None);
        assert_eq!(err.reason(), "connection refused");
    }
}
