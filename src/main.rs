use clap::Parser;
use docvoice::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse(args) => cli::parse::run(args).await,
        Command::Stream(args) => cli::stream::run(args).await,
        Command::Build(args) => cli::build::run(args).await,
        Command::Presets(args) => cli::presets::run(args).await,
    }
}
