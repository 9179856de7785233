//! CLI command for data export

use crate::error::{AuditError, AuditResult};
use crate::export::{export_entries_csv, export_full_json, export_full_yaml};
use crate::storage::Storage;
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (field entries only)
    Csv,
    /// JSON format (full store)
    Json,
    /// YAML format (full store, human-readable)
    Yaml,
}

/// Arguments of `trail export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Handle `trail export`
pub fn handle_export_command(storage: &Storage, args: ExportArgs) -> AuditResult<()> {
    match &args.output {
        Some(output) => {
            let file = File::create(output).map_err(|e| {
                AuditError::Export(format!(
                    "Failed to create file {}: {}",
                    output.display(),
                    e
                ))
            })?;
            let mut writer = BufWriter::new(file);
            write_export(storage, &mut writer, &args)?;
            writer
                .flush()
                .map_err(|e| AuditError::Export(e.to_string()))?;

            eprintln!("Exported audit store to: {}", output.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_export(storage, &mut writer, &args)?;
            writeln!(writer).map_err(|e| AuditError::Export(e.to_string()))?;
        }
    }

    Ok(())
}

fn write_export<W: Write>(storage: &Storage, writer: &mut W, args: &ExportArgs) -> AuditResult<()> {
    match args.format {
        ExportFormat::Csv => export_entries_csv(storage, writer),
        ExportFormat::Json => export_full_json(storage, writer, args.pretty),
        ExportFormat::Yaml => export_full_yaml(storage, writer),
    }
}
