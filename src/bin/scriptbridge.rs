// src/bin/scriptbridge.rs

//! The `scriptbridge` command-line tool.

use anyhow::Result;
use clap::Parser;
use colored::*;
use scriptbridge::{
    ScriptError,
    cli::{Cli, Commands, handlers},
};

/// Sets up logging, parses arguments, dispatches to the handler and
/// performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);

        // A failing script hands its own exit code back to the shell.
        let code = e
            .downcast_ref::<ScriptError>()
            .and_then(ScriptError::as_failure)
            .map(|failure| failure.code())
            .filter(|code| *code > 0)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);
    match &cli.command {
        Commands::Run(args) => handlers::run::handle(&cli, args),
        Commands::Repl(args) => handlers::repl::handle(&cli, args),
    }
}
