//! Bulk provisioning of LDAP user accounts.
//!
//! A batch of candidate users is read from a comma-delimited file, checked
//! against the directory one record at a time, created where absent, and the
//! per-record outcomes are folded into a [`ReportSummary`] that callers render
//! however they like. Account administration (show, list, delete) shares the
//! same [`DirectoryClient`] seam.

pub mod config;
pub mod directory;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use directory::{DirectoryClient, DirectoryConnector, DirectoryError, DirectoryLayout};
pub use workflows::provisioning::{
    BatchImporter, CandidateRecord, ImportReport, Outcome, ParseError, RecordParser,
    ReportSummary,
};
