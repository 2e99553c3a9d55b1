//! Export CLI command

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{FintrackError, FintrackResult};
use crate::export::{export_full_json, export_full_yaml, export_transactions_csv};
use crate::services::LedgerService;
use crate::storage::Storage;

/// Output format for `fintrack export`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Transaction log only
    Csv,
    /// Full snapshot, importable
    Json,
    /// Full snapshot, importable
    Yaml,
}

/// Write the ledger to `output`, or stdout when no path is given
pub fn handle_export_command(
    storage: &Storage,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> FintrackResult<()> {
    let ledger = LedgerService::load(storage)?;

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                FintrackError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    match format {
        ExportFormat::Csv => export_transactions_csv(ledger.transactions(), &mut writer)?,
        ExportFormat::Json => {
            export_full_json(ledger.state(), &mut writer, true)?;
            writeln!(writer)?;
        }
        ExportFormat::Yaml => export_full_yaml(ledger.state(), &mut writer)?,
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!(
            "Exported {} transactions and {} recurring definitions to {}",
            ledger.transactions().len(),
            ledger.recurring().len(),
            path.display()
        );
    }

    Ok(())
}
