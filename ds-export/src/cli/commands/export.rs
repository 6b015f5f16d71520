//! Export commands

use anyhow::{Context, Result};
use ds_export_core::{EntityKind, ExportConfig, ExportSummary, Exporter};
use std::path::Path;

use crate::cli::app::ExportArgs;

/// Run an export of `kinds` and print what was written
pub fn execute(args: ExportArgs, kinds: &[EntityKind], config_path: Option<&Path>) -> Result<()> {
    let config = ExportConfig::load(config_path).context("Failed to load configuration")?;

    let summary = Exporter::new(config)
        .run(&args.file, &args.outdir, kinds)
        .with_context(|| format!("Failed to export {}", args.file.display()))?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ExportSummary) {
    println!("Export complete:");
    for file in &summary.files {
        println!("  {}: {} ({})", file.kind, file.count, file.kind.file_name());
    }
    println!("Output directory: {}", summary.out_dir.display());
}
