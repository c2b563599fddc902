mod auth;
mod commands;
mod config;
mod error;
mod graph_client;
mod merge;
mod options;
mod output;
mod prompt;
mod resolve;

use clap::Parser;
use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "m365ctl",
    about = "Manage Microsoft 365 resources using Microsoft Graph",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute the specified command
    match cli.command {
        Commands::Auth(cmd) => cmd.execute().await,
        Commands::App(cmd) => cmd.execute().await,
        Commands::Todo(cmd) => cmd.execute().await,
        Commands::User(cmd) => cmd.execute().await,
        Commands::Completions(cmd) => cmd.execute(),
    }
}
