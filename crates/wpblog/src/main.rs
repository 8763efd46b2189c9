#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod error;
mod mcp;
mod posts;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Read posts from a WordPress blog through its REST API"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Content origin of the WordPress site (overrides WPBLOG_ORIGIN)
    #[clap(long, global = true)]
    origin: Option<String>,

    /// Request timeout in seconds (overrides WPBLOG_TIMEOUT_SECS)
    #[clap(long, global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "WPBLOG_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List blog posts, one page at a time
    List(crate::posts::list::ListOptions),

    /// Read a single blog post
    Read(crate::posts::read::ReadOptions),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::List(options) => crate::posts::list::run(options, app.global).await,
        SubCommands::Read(options) => crate::posts::read::run(options, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
