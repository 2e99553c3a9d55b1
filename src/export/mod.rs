//! Export and import of ledger data
//!
//! - CSV: the transaction log, spreadsheet-compatible
//! - JSON: full snapshot, machine-readable, importable
//! - YAML: full snapshot, human-readable, importable

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_transactions_csv;
pub use json::{export_full_json, import_from_json, ExportMetadata, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
