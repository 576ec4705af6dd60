use super::outcome::{Outcome, OutcomeStatus, RecordFailure};
use serde::Serialize;
use std::fmt;

/// Ids sharing one failure reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCluster {
    pub reason: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRecord {
    pub id: String,
    pub reason: String,
}

/// How a batch run went, shaped for the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSummary {
    /// The batch held no data rows.
    NoValidRows,
    AllCreated {
        ids: Vec<String>,
    },
    /// Every record failed for the same reason.
    CommonFailure {
        reason: String,
        ids: Vec<String>,
    },
    /// Every record failed; failures grouped by reason in first-seen order.
    ClusteredFailures {
        clusters: Vec<FailureCluster>,
    },
    Partial {
        failures: Vec<FailedRecord>,
        created: Vec<String>,
    },
}

impl ReportSummary {
    /// Folds outcomes into a summary. Listings keep the outcome order.
    pub fn summarize(outcomes: &[Outcome]) -> Self {
        if outcomes.is_empty() {
            return ReportSummary::NoValidRows;
        }

        let mut created = Vec::new();
        let mut failures: Vec<(&str, &RecordFailure)> = Vec::new();
        for outcome in outcomes {
            match &outcome.status {
                OutcomeStatus::Created => created.push(outcome.id.clone()),
                OutcomeStatus::Failed(failure) => failures.push((outcome.id.as_str(), failure)),
            }
        }

        if failures.is_empty() {
            return ReportSummary::AllCreated { ids: created };
        }

        if !created.is_empty() {
            return ReportSummary::Partial {
                failures: failures
                    .into_iter()
                    .map(|(id, failure)| FailedRecord {
                        id: id.to_string(),
                        reason: failure.reason().to_string(),
                    })
                    .collect(),
                created,
            };
        }

        let mut clusters = cluster(&failures);
        if clusters.len() == 1 {
            let FailureCluster { reason, ids } = clusters.remove(0);
            return ReportSummary::CommonFailure { reason, ids };
        }

        ReportSummary::ClusteredFailures { clusters }
    }
}

/// Groups ids by exact reason text, clusters in first-seen order.
fn cluster(failures: &[(&str, &RecordFailure)]) -> Vec<FailureCluster> {
    let mut clusters: Vec<FailureCluster> = Vec::new();
    for (id, failure) in failures {
        let reason = failure.reason();
        match clusters.iter_mut().find(|cluster| cluster.reason == reason) {
            Some(cluster) => cluster.ids.push(id.to_string()),
            None => clusters.push(FailureCluster {
                reason: reason.to_string(),
                ids: vec![id.to_string()],
            }),
        }
    }
    clusters
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSummary::NoValidRows => {
                write!(f, "The batch does not contain any valid data rows.")
            }
            ReportSummary::AllCreated { ids } => {
                write!(f, "All users successfully added: {}", ids.join(" "))
            }
            ReportSummary::CommonFailure { reason, ids } => write!(
                f,
                "None of the {} users could be added, all for the same reason: {reason}",
                ids.len()
            ),
            ReportSummary::ClusteredFailures { clusters } => {
                write!(f, "None of the users could be added, for the following reasons:")?;
                for cluster in clusters {
                    write!(
                        f,
                        "\n- {} ({}): {}",
                        cluster.reason,
                        cluster.ids.len(),
                        cluster.ids.join(" ")
                    )?;
                }
                Ok(())
            }
            ReportSummary::Partial { failures, created } => {
                write!(f, "Some users couldn't be added:")?;
                for failure in failures {
                    write!(f, "\n- {}: {}", failure.id, failure.reason)?;
                }
                write!(f, "\nSuccessfully added users: {}", created.join(" "))
            }
        }
    }
}
