use super::outcome::{Outcome, RecordFailure};
use super::record::CandidateRecord;
use crate::directory::{DirectoryClient, DirectoryLayout};
use tracing::{debug, info, instrument};

/// Create-only reconciliation of candidate records against the directory.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    layout: DirectoryLayout,
}

impl ReconciliationEngine {
    pub fn new(layout: DirectoryLayout) -> Self {
        Self { layout }
    }

    /// Processes `records` strictly in order and returns exactly one outcome
    /// per record. Directory failures are recorded, never propagated.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn reconcile<D>(&self, records: &[CandidateRecord], directory: &mut D) -> Vec<Outcome>
    where
        D: DirectoryClient + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            outcomes.push(self.reconcile_record(record, directory));
        }

        let created = outcomes.iter().filter(|outcome| outcome.is_created()).count();
        info!(
            created,
            failed = outcomes.len() - created,
            "reconciled import batch"
        );

        outcomes
    }

    fn reconcile_record<D>(&self, record: &CandidateRecord, directory: &mut D) -> Outcome
    where
        D: DirectoryClient + ?Sized,
    {
        let dn = self.layout.user_dn(record.id());

        if directory.exists(&dn) {
            debug!(%dn, "skipping existing user");
            return Outcome::failed(record.id(), RecordFailure::AlreadyExists);
        }

        match directory.create(record, &dn) {
            Ok(()) => {
                debug!(%dn, "created user");
                Outcome::created(record.id())
            }
            Err(err) => {
                debug!(%dn, error = %err, "directory rejected user");
                Outcome::failed(record.id(), RecordFailure::from(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryError, InMemoryDirectory};

    fn record(id: &str) -> CandidateRecord {
        CandidateRecord::new(id, "Grace Hopper", "555", "g@example.com", "Navy", "Admiral")
            .expect("valid record")
    }

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(DirectoryLayout::new("o=test"))
    }

    #[test]
    fn creates_absent_users() {
        let mut directory = InMemoryDirectory::new();
        let outcomes = engine().reconcile(&[record("grace")], &mut directory);
        assert_eq!(outcomes, vec![Outcome::created("grace")]);
        assert!(directory.contains("cn=grace,ou=users,o=test"));
    }

    #[test]
    fn existing_users_are_never_overwritten() {
        let mut directory = InMemoryDirectory::new();
        directory.insert_entry("cn=grace,ou=users,o=test", &[("cn", "grace"), ("sn", "Original")]);

        let outcomes = engine().reconcile(&[record("grace")], &mut directory);
        assert_eq!(
            outcomes,
            vec![Outcome::failed("grace", RecordFailure::AlreadyExists)]
        );

        let attributes = directory
            .fetch_attributes("cn=grace,ou=users,o=test", &["sn"])
            .expect("lookup succeeds")
            .expect("entry present");
        assert_eq!(attributes.get("sn").map(String::as_str), Some("Original"));
    }

    #[test]
    fn rejection_fails_only_that_record() {
        let mut directory = InMemoryDirectory::new();
        directory.fail_create("cn=b,ou=users,o=test", DirectoryError::rejected(53));

        let outcomes = engine().reconcile(&[record("a"), record("b"), record("c")], &mut directory);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_created());
        assert_eq!(
            outcomes[1].failure().map(RecordFailure::reason),
            Some("Unwilling To Perform")
        );
        assert!(outcomes[2].is_created());
    }

    #[test]
    fn unreachable_directory_still_yields_one_outcome_per_record() {
        let mut directory = InMemoryDirectory::new();
        for id in ["a", "b"] {
            directory.fail_create(
                format!("cn={id},ou=users,o=test"),
                DirectoryError::Unavailable("connection reset".to_string()),
            );
        }

        let outcomes = engine().reconcile(&[record("a"), record("b")], &mut directory);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|outcome| matches!(
            outcome.failure(),
            Some(RecordFailure::DirectoryRejected { code: None, .. })
        )));
    }
}
