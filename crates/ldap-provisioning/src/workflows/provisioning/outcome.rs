use crate::directory::DirectoryError;
use serde::Serialize;
use std::fmt;

/// Why a single record was not created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordFailure {
    AlreadyExists,
    DirectoryRejected { code: Option<u32>, reason: String },
}

impl RecordFailure {
    pub fn reason(&self) -> &str {
        match self {
            RecordFailure::AlreadyExists => "User already exists",
            RecordFailure::DirectoryRejected { reason, .. } => reason,
        }
    }
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl From<DirectoryError> for RecordFailure {
    fn from(err: DirectoryError) -> Self {
        RecordFailure::DirectoryRejected {
            code: err.code(),
            reason: err.reason().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failure", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Created,
    Failed(RecordFailure),
}

/// Terminal result of attempting to create one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub id: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Created,
        }
    }

    pub fn failed(id: impl Into<String>, failure: RecordFailure) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Failed(failure),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self.status, OutcomeStatus::Created)
    }

    pub fn failure(&self) -> Option<&RecordFailure> {
        match &self.status {
            OutcomeStatus::Created => None,
            OutcomeStatus::Failed(failure) => Some(failure),
        }
    }
}
