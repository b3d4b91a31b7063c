use anyhow::Result;
use clap::Parser;
use news_ticker::cli::{Cli, Command};
use news_ticker::{post, server, watch};

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Serve(args) => server::run(args).await,
        Command::Watch(args) => watch::run(args).await,
        Command::Post(args) => post::run(args).await,
    }
}
