use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ds-export",
    version,
    about = "Export Zoho Creator .ds files to JSON",
    long_about = "ds-export reads a Zoho Creator application export (.ds) and writes its forms, fields, reports, workflows, functions and pages as one JSON file per entity kind."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every entity kind
    #[command(about = "Write all nine JSON files")]
    Full(ExportArgs),

    #[command(about = "Write forms.json")]
    Forms(ExportArgs),

    #[command(about = "Write form_fields.json")]
    FormFields(ExportArgs),

    #[command(about = "Write reports.json")]
    Reports(ExportArgs),

    #[command(about = "Write report_fields.json")]
    ReportFields(ExportArgs),

    #[command(about = "Write form_workflows_with_code.json")]
    FormWorkflows(ExportArgs),

    #[command(about = "Write report_workflows_with_code.json")]
    ReportWorkflows(ExportArgs),

    #[command(about = "Write functions_with_code.json")]
    Functions(ExportArgs),

    #[command(about = "Write pages.json")]
    Pages(ExportArgs),

    #[command(about = "Write page_components.json")]
    PageComponents(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Path to the .ds export file
    #[arg(short, long, help = "Zoho Creator .ds export file")]
    pub file: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".", help = "Directory for the JSON files")]
    pub outdir: PathBuf,
}
