use clap::{Parser, Subcommand};

use crate::post::PostArgs;
use crate::server::ServeArgs;
use crate::watch::WatchArgs;

#[derive(Debug, Parser)]
#[command(author, version, about = "Live news ticker server and terminal client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the news API server and live feed
    Serve(ServeArgs),
    /// Follow the live ticker in the terminal
    Watch(WatchArgs),
    /// Publish a news item through the API
    Post(PostArgs),
}
