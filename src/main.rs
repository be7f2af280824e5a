use anyhow::Result;
use colored::Colorize;

use corps_scoring::cli::Command;
use corps_scoring::{
    handle_completions, handle_import, handle_init, handle_process, handle_resolve_matchups, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::Import { path } => handle_import(path),
        Command::Process { day, seed } => handle_process(*day, *seed),
        Command::ResolveMatchups { day } => handle_resolve_matchups(*day),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
