mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{lint, render, LintArgs, RenderArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// A2UI CLI - replay server message streams into resolved component trees
#[derive(Parser, Debug)]
#[command(name = "a2ui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a stream and print the resolved trees
    Render(RenderArgs),

    /// Check stream files for malformed lines, cycles and bad data updates
    Lint(LintArgs),
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match cli.command {
        Command::Render(args) => render(args, &config),
        Command::Lint(args) => lint(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
