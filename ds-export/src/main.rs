use anyhow::Result;
use clap::Parser;
use ds_export_core::EntityKind;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Logs go to stderr; stdout carries the export summary
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Full(args) => {
            info!("Full export command: {:?}", args);
            cli::commands::export::execute(args, &EntityKind::ALL, config)?;
        }
        Commands::Forms(args) => {
            info!("Forms command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::Forms], config)?;
        }
        Commands::FormFields(args) => {
            info!("Form fields command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::FormFields], config)?;
        }
        Commands::Reports(args) => {
            info!("Reports command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::Reports], config)?;
        }
        Commands::ReportFields(args) => {
            info!("Report fields command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::ReportFields], config)?;
        }
        Commands::FormWorkflows(args) => {
            info!("Form workflows command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::FormWorkflows], config)?;
        }
        Commands::ReportWorkflows(args) => {
            info!("Report workflows command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::ReportWorkflows], config)?;
        }
        Commands::Functions(args) => {
            info!("Functions command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::Functions], config)?;
        }
        Commands::Pages(args) => {
            info!("Pages command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::Pages], config)?;
        }
        Commands::PageComponents(args) => {
            info!("Page components command: {:?}", args);
            cli::commands::export::execute(args, &[EntityKind::PageComponents], config)?;
        }
    }

    Ok(())
}
