//! Service layer for fintrack
//!
//! The schedule evaluator, reconciler, materialization and duplicate checks
//! are pure functions. `LedgerService` ties them to a `LedgerStore` and owns
//! the in-memory ledger state.

pub mod duplicates;
pub mod ledger;
pub mod materialize;
pub mod reconcile;
pub mod schedule;

pub use ledger::{LedgerService, LedgerState};
pub use materialize::{materialize_due, AUTOMATIC_SUFFIX};
pub use reconcile::{apply_transaction, ensure_sufficient_funds, reverse_transaction};
pub use schedule::{is_due_today, next_occurrence, upcoming, Occurrence, UpcomingOccurrence};
