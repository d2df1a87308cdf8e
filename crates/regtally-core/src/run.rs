//! Per-run outcome records and the aggregate run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Agency;

/// Result of one agency's count lookup.
///
/// A failed lookup always carries the cause; a successful one never does.
#[derive(Debug, Clone, Serialize)]
pub enum Outcome {
    Counted { count: u64 },
    Failed { error: String },
}

/// One agency's document count as observed during a single run.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentCount {
    pub agency: Agency,
    pub outcome: Outcome,
    pub observed_at: DateTime<Utc>,
}

impl DocumentCount {
    /// Record a successful lookup.
    pub fn counted(agency: Agency, count: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            agency,
            outcome: Outcome::Counted { count },
            observed_at,
        }
    }

    /// Record a failed lookup with its cause.
    pub fn failed(agency: Agency, error: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        let error = error.into();
        debug_assert!(!error.is_empty(), "failed record needs a cause");
        Self {
            agency,
            outcome: Outcome::Failed { error },
            observed_at,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Counted { .. })
    }

    /// Document count, zero for failed lookups.
    pub fn count(&self) -> u64 {
        match self.outcome {
            Outcome::Counted { count } => count,
            Outcome::Failed { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Counted { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

/// Aggregate results of one counting run.
///
/// Built only through [`from_records`](Self::from_records), so the counters
/// always agree with the record list.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub with_documents: usize,
    pub without_documents: usize,
    pub total_documents: u64,
    pub elapsed_seconds: f64,
    pub finished_at: DateTime<Utc>,
    pub records: Vec<DocumentCount>,
}

impl RunSummary {
    /// Aggregate a record list into a run summary.
    ///
    /// A succeeded record with a positive count is "with documents"; a
    /// succeeded record with zero documents counts separately. Failed
    /// records contribute to neither bucket.
    pub fn from_records(
        records: Vec<DocumentCount>,
        elapsed_seconds: f64,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut with_documents = 0;
        let mut without_documents = 0;
        let mut total_documents = 0u64;

        for record in &records {
            if record.succeeded() {
                succeeded += 1;
                let count = record.count();
                if count > 0 {
                    with_documents += 1;
                    total_documents += count;
                } else {
                    without_documents += 1;
                }
            } else {
                failed += 1;
            }
        }

        Self {
            total: records.len(),
            succeeded,
            failed,
            with_documents,
            without_documents,
            total_documents,
            elapsed_seconds,
            finished_at,
            records,
        }
    }

    /// Share of successful lookups, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64 * 100.0
    }

    /// Short human-readable summary for logs and the summary report.
    pub fn overview(&self) -> String {
        format!(
            "Processed {} agencies in {:.1}s\n\
             Success rate: {:.1}% ({}/{})\n\
             Agencies with documents: {}\n\
             Total documents found: {}",
            self.total,
            self.elapsed_seconds,
            self.success_rate(),
            self.succeeded,
            self.total,
            self.with_documents,
            self.total_documents,
        )
    }
}
