//! Reconciliation of a local agency list against the API's document counts.

pub mod observer;
pub mod reconcile;

pub use observer::{NoProgress, ReconcileObserver};
pub use reconcile::Reconciler;
