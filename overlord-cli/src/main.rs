//! OVERLORD CLI - Command-line interface
//!
//! Commands:
//! - play: AI self-play on a scenario
//! - show: Print a scenario's board, hands and opening moves

use clap::{Parser, Subcommand};

mod play_cmd;
mod show_cmd;

#[derive(Parser)]
#[command(name = "overlord")]
#[command(about = "OVERLORD hex wargame engine")]
struct Cli {
    /// Seed for deck shuffling, dice and AI noise
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play AI against AI
    Play(play_cmd::PlayArgs),
    /// Show a scenario and the first player's legal moves
    Show(show_cmd::ShowArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Show(args) => show_cmd::run(args, cli.seed),
    }
}
