use clap::Parser;

use compscan_cli::cli::{Cli, Commands};
use compscan_cli::commands;
use compscan_cli::error::CliError;
use compscan_cli::logging;
use compscan_cli::output::OutputWriter;
use compscan_core::config::{CompscanConfig, GeneralConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Only [general] is needed up front; commands report config errors themselves.
    let mut general = CompscanConfig::load(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("warning: {e}");
    }
    compscan_core::metrics::describe_all();

    tracing::debug!(config = %cli.config.display(), "compscan starting");

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, &writer).await,
        Commands::Rules(args) => commands::rules::execute(args, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
