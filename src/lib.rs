//! fintrack - personal finance tracking from the terminal
//!
//! This library keeps three account balances (cash, bank, savings), an
//! append-only transaction log and a set of recurring income and expense
//! definitions, and keeps them consistent with each other.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Core data models (balances, transactions, recurring definitions)
//! - `services`: Schedule evaluation, balance reconciliation and the ledger controller
//! - `storage`: The `LedgerStore` seam and its JSON-file and in-memory implementations
//! - `audit`: Append-only audit log of every change
//! - `display`: Plain-text tables for the terminal
//! - `export`: CSV, JSON and YAML export plus snapshot import
//! - `cli`: Command handlers behind the `fintrack` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use fintrack::config::FintrackPaths;
//! use fintrack::services::LedgerService;
//! use fintrack::storage::Storage;
//!
//! let storage = Storage::new(FintrackPaths::new()?)?;
//! let mut ledger = LedgerService::load(&storage)?;
//! let recorded = ledger.run_due(chrono::Local::now().date_naive())?;
//! ```

use std::sync::Once;

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{FintrackError, FintrackResult};

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "FINTRACK_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the stderr `tracing` subscriber once per process
///
/// `FINTRACK_LOG` wins over `default_filter` when it is set and parses.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
