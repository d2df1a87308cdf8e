//! The reconciliation loop: match agencies against fetched counts.

use std::time::Instant;

use chrono::Utc;
use regtally_client::{CountFetcher, HttpTransport};
use regtally_core::{Agency, CountMap, Coverage, DocumentCount, RunSummary, validate_matching};
use tracing::{error, info, warn};

use crate::observer::ReconcileObserver;

/// Joins a caller-supplied agency list against the API's count map.
///
/// Each agency is classified as counted, zero-but-exists, not-found, or
/// fetch-error; records come out in input order, one per input row, with
/// duplicates processed independently.
pub struct Reconciler<T, O> {
    fetcher: CountFetcher<T>,
    observer: O,
}

impl<T: HttpTransport, O: ReconcileObserver> Reconciler<T, O> {
    pub fn new(fetcher: CountFetcher<T>, observer: O) -> Self {
        Self { fetcher, observer }
    }

    /// Run the full reconciliation.
    ///
    /// One bulk facet fetch classifies most agencies; agencies absent
    /// from the facet get an individual existence check so that "zero
    /// documents" and "unknown to the API" stay distinct. If the bulk
    /// fetch itself fails, no partial data is trusted: every agency is
    /// recorded as failed with the propagated cause.
    pub async fn reconcile(&mut self, agencies: &[Agency]) -> RunSummary {
        let started = Instant::now();
        self.observer.on_start(agencies.len());
        info!(agencies = agencies.len(), "starting document count run");

        let counts = match self.fetcher.bulk_counts().await {
            Ok(counts) => counts,
            Err(err) => {
                error!(error = %err, "bulk count fetch failed");
                return self.finish_all_failed(agencies, &err.to_string(), started);
            }
        };

        // Advisory only: a messy match still runs to completion.
        for issue in validate_matching(agencies, &counts) {
            warn!(issue = %issue, "matching validation issue");
        }
        let coverage = Coverage::build(agencies, &counts);
        if !coverage.missing_from_api.is_empty() || !coverage.extra_in_api.is_empty() {
            info!(
                missing_from_api = coverage.missing_from_api.len(),
                extra_in_api = coverage.extra_in_api.len(),
                api_total_documents = coverage.total_documents,
                "agency list and API facet differ"
            );
        }

        let mut records = Vec::with_capacity(agencies.len());
        for agency in agencies {
            self.observer.on_agency_start(agency);
            let record = self.lookup(agency, &counts).await;
            self.observer.on_agency_done(&record);
            records.push(record);
        }

        let summary =
            RunSummary::from_records(records, started.elapsed().as_secs_f64(), Utc::now());
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            total_documents = summary.total_documents,
            "document count run finished"
        );
        self.observer.on_finish(&summary);
        summary
    }

    /// Classify one agency against the bulk map.
    ///
    /// A per-agency failure never aborts the run; the caller keeps
    /// looping over the remaining agencies.
    async fn lookup(&mut self, agency: &Agency, counts: &CountMap) -> DocumentCount {
        let now = Utc::now();
        match counts.get(&agency.slug) {
            Some(&count) if count >= 0 => {
                DocumentCount::counted(agency.clone(), count as u64, now)
            }
            Some(&count) => {
                // Unreachable via the fetcher, which drops such entries;
                // hand-built maps can still carry them.
                warn!(slug = %agency.slug, count, "invalid count in bulk map");
                DocumentCount::failed(
                    agency.clone(),
                    format!("invalid document count {count} in bulk response"),
                    now,
                )
            }
            None => match self.fetcher.agency_exists(&agency.slug).await {
                Ok(true) => DocumentCount::counted(agency.clone(), 0, now),
                Ok(false) => {
                    warn!(slug = %agency.slug, "agency not found in Federal Register API");
                    DocumentCount::failed(
                        agency.clone(),
                        "agency not found in Federal Register API",
                        now,
                    )
                }
                Err(err) => {
                    warn!(slug = %agency.slug, error = %err, "existence check failed");
                    DocumentCount::failed(agency.clone(), err.to_string(), now)
                }
            },
        }
    }

    fn finish_all_failed(
        &mut self,
        agencies: &[Agency],
        error: &str,
        started: Instant,
    ) -> RunSummary {
        let now = Utc::now();
        let records = agencies
            .iter()
            .map(|agency| DocumentCount::failed(agency.clone(), error, now))
            .collect();
        let summary = RunSummary::from_records(records, started.elapsed().as_secs_f64(), now);
        self.observer.on_finish(&summary);
        summary
    }
}
