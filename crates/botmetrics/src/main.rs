mod alerts;
mod cli;
mod commands;
mod context;

use botmetrics_core::FilterSpec;
use clap::Parser;
use cli::{Cli, Commands};
use context::ViewContext;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so report output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let home = cli.home.as_deref();

    match cli.command {
        Commands::Ingest {
            file,
            format,
            replace,
        } => {
            let ctx = ViewContext::load(home, FilterSpec::default())?;
            commands::ingest::run(&ctx, &file, format.resolve(), replace)
        }
        Commands::Report {
            filters,
            by,
            json,
            detailed,
        } => {
            let ctx = ViewContext::load(home, filters.into())?;
            commands::report::run(&ctx, by, json, detailed)
        }
        Commands::Errors { filters, json } => {
            let ctx = ViewContext::load(home, filters.into())?;
            commands::errors::run(&ctx, json)
        }
        Commands::History { filters, limit } => {
            let ctx = ViewContext::load(home, filters.into())?;
            commands::history::run(&ctx, limit)
        }
        Commands::Export { output, filters } => {
            let ctx = ViewContext::load(home, filters.into())?;
            commands::export::run(&ctx, &output)
        }
        Commands::Version => commands::version::run(),
    }
}
