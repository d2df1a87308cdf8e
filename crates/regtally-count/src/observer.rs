//! Progress observer port for reconciliation runs.
//!
//! The reconciler reports progress through this trait instead of the
//! caller splicing callbacks into it; the CLI implements it for console
//! output. All methods default to no-ops, so implementers only override
//! the callbacks they care about.

use regtally_core::{Agency, DocumentCount, RunSummary};

/// Callbacks fired during a reconciliation run, in input-agency order.
pub trait ReconcileObserver {
    /// Called once before any lookups, with the number of agencies.
    fn on_start(&self, _total: usize) {}

    /// Called just before an agency's lookup begins.
    fn on_agency_start(&self, _agency: &Agency) {}

    /// Called with the finished record for an agency.
    fn on_agency_done(&self, _record: &DocumentCount) {}

    /// Called once with the final summary, also when the bulk fetch failed.
    fn on_finish(&self, _summary: &RunSummary) {}
}

/// No-op observer for callers that do not track progress.
pub struct NoProgress;

impl ReconcileObserver for NoProgress {}

impl<O: ReconcileObserver + ?Sized> ReconcileObserver for &O {
    fn on_start(&self, total: usize) {
        (**self).on_start(total);
    }
    fn on_agency_start(&self, agency: &Agency) {
        (**self).on_agency_start(agency);
    }
    fn on_agency_done(&self, record: &DocumentCount) {
        (**self).on_agency_done(record);
    }
    fn on_finish(&self, summary: &RunSummary) {
        (**self).on_finish(summary);
    }
}

impl<O: ReconcileObserver + ?Sized> ReconcileObserver for Box<O> {
    fn on_start(&self, total: usize) {
        (**self).on_start(total);
    }
    fn on_agency_start(&self, agency: &Agency) {
        (**self).on_agency_start(agency);
    }
    fn on_agency_done(&self, record: &DocumentCount) {
        (**self).on_agency_done(record);
    }
    fn on_finish(&self, summary: &RunSummary) {
        (**self).on_finish(summary);
    }
}
