use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use valtorix_term::config::Config;
use valtorix_term::terminal::Terminal;

/// Valtorix - SOC training terminal with simulated network commands
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Local user shown in the prompt
    #[arg(long)]
    user: Option<String>,

    /// Local host shown in the prompt
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Log to stderr so messages never land in the terminal UI
    let log_level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    let mut config = if let Some(config_path) = args.config {
        Config::load_from_file(&config_path)
            .with_context(|| format!("Failed to load config from {config_path}"))?
    } else {
        Config::load_default()?
    };

    if let Some(user) = args.user {
        config.environment.user = user;
    }
    if let Some(host) = args.host {
        config.environment.host = host;
    }

    if !std::io::stdout().is_terminal() {
        eprintln!("Error: valtorix-term must be run in an interactive terminal.");
        std::process::exit(1);
    }

    let mut terminal = Terminal::new(config)?;
    if let Err(e) = terminal.run().await {
        eprintln!("\nvaltorix-term encountered an error: {e}");
        eprintln!("\nIf the terminal display is corrupted, try running:");
        eprintln!("  reset");
        return Err(e);
    }

    Ok(())
}
