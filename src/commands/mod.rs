//! Command-line interface for kaslmon.
//!
//! ```text
//! kaslmon init [--delete]        configure thresholds interactively
//! kaslmon show                   print the settings in effect
//! kaslmon watch [--duration N]   classify live input and print transitions
//! ```

pub mod init;
pub mod show;
pub mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Show activity monitor settings")]
    Show,
    #[command(about = "Watch user activity and print state changes")]
    Watch(watch::WatchArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Show => show::cmd(),
            Commands::Watch(args) => watch::cmd(args).await,
        }
    }
}
