use anyhow::Result;

use clap::{Parser, Subcommand};

mod onboard;
mod run;

#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the chat api over http
    Run(run::RunArgs),
    /// Chat with fifi in the terminal
    Chat(run::RunArgs),
    /// Onboard new user, and generate configurations
    Onboard,
}

pub async fn cli() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Onboard => onboard::onboard().await?,
        Commands::Run(args) => run::run(args.clone()).await?,
        Commands::Chat(args) => run::chat(args.clone()).await?,
    }

    Ok(())
}
