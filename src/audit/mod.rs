//! Audit logging for fintrack
//!
//! Every committed change to the ledger (a transaction recorded or deleted,
//! a balance update, a recurring definition added or changed) is appended to
//! `audit.log` as one JSON line.
//!
//! - `AuditEntry`: timestamp, operation, entity and before/after snapshots.
//! - `AuditLogger`: the JSONL file writer.
//! - `generate_diff`: human-readable summary of what changed in an update.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
