mod engine;
mod outcome;
mod parser;
mod record;
pub mod report;

use crate::directory::{DirectoryClient, DirectoryLayout};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

pub use engine::ReconciliationEngine;
pub use outcome::{Outcome, OutcomeStatus, RecordFailure};
pub use parser::{ParseError, RecordParser, EXPECTED_HEADER, FIELD_COUNT};
pub use record::{CandidateRecord, ParsedName};
pub use report::ReportSummary;

/// Everything a caller needs to render one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<Outcome>,
    pub summary: ReportSummary,
}

impl ImportReport {
    pub fn record_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn created_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_created()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.record_count() - self.created_count()
    }
}

/// Parse, reconcile and summarize one batch.
#[derive(Debug, Clone)]
pub struct BatchImporter {
    engine: ReconciliationEngine,
}

impl BatchImporter {
    pub fn new(layout: DirectoryLayout) -> Self {
        Self {
            engine: ReconciliationEngine::new(layout),
        }
    }

    /// Reconciles already-parsed records. Parsing first lets callers reject a
    /// bad file before opening a directory session.
    pub fn run<D>(&self, records: &[CandidateRecord], directory: &mut D) -> ImportReport
    where
        D: DirectoryClient + ?Sized,
    {
        let outcomes = self.engine.reconcile(records, directory);
        let summary = ReportSummary::summarize(&outcomes);
        ImportReport { outcomes, summary }
    }

    pub fn from_reader<R, D>(&self, reader: R, directory: &mut D) -> Result<ImportReport, ParseError>
    where
        R: Read,
        D: DirectoryClient + ?Sized,
    {
        let records = RecordParser::from_reader(reader)?;
        Ok(self.run(&records, directory))
    }

    pub fn from_path<P, D>(&self, path: P, directory: &mut D) -> Result<ImportReport, ParseError>
    where
        P: AsRef<Path>,
        D: DirectoryClient + ?Sized,
    {
        let records = RecordParser::from_path(path)?;
        Ok(self.run(&records, directory))
    }
}
