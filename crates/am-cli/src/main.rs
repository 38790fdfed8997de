//! amtool binary entrypoint.

use std::io;
use std::process::ExitCode;

use am_silences::{ConfigFile, Defaults, EffectiveConfig, HttpSilenceClient};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use am_cli::cli::{Cli, Commands, Format, SilenceCommands};
use am_cli::commands::SilenceAddCommand;
use am_cli::output::OutputFormat;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), am_cli::CliError> {
    let loaded = ConfigFile::discover(cli.config.as_deref())?;
    let config =
        EffectiveConfig::resolve(&cli.flag_values(), &loaded.file, &Defaults::from_env())?;
    if config.verbose {
        if let Some(path) = &loaded.path {
            eprintln!("Using config file: {}", path.display());
        }
    }

    let format = OutputFormat::new(Format::resolve(cli.output, loaded.file.output.as_deref())?);
    let client = HttpSilenceClient::new(config.alertmanager_url.clone())?;
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();

    match &cli.command {
        Commands::Silence {
            command: SilenceCommands::Add(args),
        } => {
            let cmd = SilenceAddCommand::new(&client, &config);
            cmd.execute(&mut stdout, &mut stderr, &format, &args.matchers, Utc::now())
                .await?;
        }
    }

    Ok(())
}
