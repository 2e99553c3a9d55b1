//! Full ledger snapshot in YAML

use std::io::Write;

use crate::error::{FintrackError, FintrackResult};
use crate::export::json::FullExport;
use crate::services::LedgerState;

/// Write the ledger as YAML with a short comment header
pub fn export_full_yaml<W: Write>(state: &LedgerState, writer: &mut W) -> FintrackResult<()> {
    let export = FullExport::from_state(state);
    let io_err = |e: std::io::Error| FintrackError::Export(e.to_string());

    writeln!(writer, "# fintrack ledger export").map_err(io_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(io_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| FintrackError::Export(e.to_string()))
}

/// Parse and validate a YAML export; comment lines are ignored by the parser
pub fn import_from_yaml(yaml_str: &str) -> FintrackResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| FintrackError::Import(e.to_string()))?;

    export.validate().map_err(FintrackError::Import)?;

    Ok(export)
}
