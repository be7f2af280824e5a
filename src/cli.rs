use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "fantasy drum corps daily scoring engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Create the database schema if it does not exist
    Init,
    /// Merge a JSON dump of historical scores into the database
    Import {
        /// Path to the dump file
        path: PathBuf,
    },
    /// Score one season day (and resolve matchups on week boundaries)
    Process {
        /// Season day, 1-49
        #[arg(short, long)]
        day: u32,
        /// Seed for regression jitter (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Resolve the week's league matchups
    ResolveMatchups {
        /// Season day; must end a week
        #[arg(short, long)]
        day: u32,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
