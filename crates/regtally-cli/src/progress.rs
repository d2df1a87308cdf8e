//! Console progress rendering for a counting run.

use std::cell::Cell;
use std::time::Instant;

use regtally_core::{Agency, DocumentCount, RunSummary};
use regtally_count::ReconcileObserver;

/// Prints interval progress updates with an ETA to stderr.
///
/// Updates are emitted every `interval_percent` of completed agencies,
/// and always for the final one, so slow runs stay quiet but visible.
pub struct ConsoleProgress {
    interval_percent: f64,
    total: Cell<usize>,
    processed: Cell<usize>,
    succeeded: Cell<usize>,
    failed: Cell<usize>,
    last_reported: Cell<f64>,
    started: Cell<Option<Instant>>,
}

impl ConsoleProgress {
    pub fn new(interval_percent: f64) -> Self {
        Self {
            interval_percent: interval_percent.clamp(0.1, 100.0),
            total: Cell::new(0),
            processed: Cell::new(0),
            succeeded: Cell::new(0),
            failed: Cell::new(0),
            last_reported: Cell::new(0.0),
            started: Cell::new(None),
        }
    }

    fn eta_seconds(&self) -> Option<f64> {
        let processed = self.processed.get();
        let total = self.total.get();
        let started = self.started.get()?;
        if processed == 0 || processed >= total {
            return None;
        }
        let elapsed = started.elapsed().as_secs_f64();
        Some(elapsed / processed as f64 * (total - processed) as f64)
    }
}

impl ReconcileObserver for ConsoleProgress {
    fn on_start(&self, total: usize) {
        self.total.set(total);
        self.started.set(Some(Instant::now()));
        eprintln!("Counting documents for {total} agencies...");
    }

    fn on_agency_start(&self, _agency: &Agency) {}

    fn on_agency_done(&self, record: &DocumentCount) {
        self.processed.set(self.processed.get() + 1);
        if record.succeeded() {
            self.succeeded.set(self.succeeded.get() + 1);
        } else {
            self.failed.set(self.failed.get() + 1);
        }

        let total = self.total.get().max(1);
        let percent = self.processed.get() as f64 / total as f64 * 100.0;
        let due = percent - self.last_reported.get() >= self.interval_percent;
        if due || self.processed.get() == self.total.get() {
            match self.eta_seconds() {
                Some(eta) => eprintln!(
                    "  [{percent:5.1}%] {}/{} ok {} failed {} (eta {eta:.0}s)",
                    self.processed.get(),
                    total,
                    self.succeeded.get(),
                    self.failed.get(),
                ),
                None => eprintln!(
                    "  [{percent:5.1}%] {}/{} ok {} failed {}",
                    self.processed.get(),
                    total,
                    self.succeeded.get(),
                    self.failed.get(),
                ),
            }
            self.last_reported.set(percent);
        }
    }

    fn on_finish(&self, summary: &RunSummary) {
        eprintln!(
            "Done: {}/{} succeeded, {} documents, {:.1}s",
            summary.succeeded, summary.total, summary.total_documents, summary.elapsed_seconds
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regtally_core::Agency;

    fn record(success: bool) -> DocumentCount {
        let agency = Agency::new("A", "a", "", "", true, "").unwrap();
        if success {
            DocumentCount::counted(agency, 1, Utc::now())
        } else {
            DocumentCount::failed(agency, "boom", Utc::now())
        }
    }

    #[test]
    fn counters_track_outcomes() {
        let progress = ConsoleProgress::new(10.0);
        progress.on_start(3);
        progress.on_agency_done(&record(true));
        progress.on_agency_done(&record(false));
        progress.on_agency_done(&record(true));
        assert_eq!(progress.processed.get(), 3);
        assert_eq!(progress.succeeded.get(), 2);
        assert_eq!(progress.failed.get(), 1);
    }

    #[test]
    fn eta_unavailable_before_first_record() {
        let progress = ConsoleProgress::new(10.0);
        progress.on_start(5);
        assert!(progress.eta_seconds().is_none());
    }

    #[test]
    fn interval_clamped_to_sane_range() {
        let progress = ConsoleProgress::new(0.0);
        assert!(progress.interval_percent >= 0.1);
        let progress = ConsoleProgress::new(500.0);
        assert!(progress.interval_percent <= 100.0);
    }
}
