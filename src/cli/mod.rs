// src/cli/mod.rs

//! Command-line definitions for the `scriptbridge` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod handlers;

/// scriptbridge: run interpreter scripts in batch mode or talk to them line by line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Launch options file. Defaults to `<config dir>/scriptbridge/config.toml`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interpreter command line (e.g. "python3 -u"). Takes precedence over the config file.
    #[arg(long, global = true, value_name = "CMD")]
    pub interpreter: Option<String>,

    /// The operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

/// The available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a script to completion and print its output.
    Run(RunArgs),
    /// Start a script and forward each line typed on stdin to it, printing its replies.
    Repl(ReplArgs),
}

/// Arguments shared by every subcommand that launches a script.
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Path to the executable script.
    pub script: PathBuf,

    /// Named arguments for the script, passed as `"KEY"="VALUE"` tokens.
    #[arg(value_name = "KEY=VALUE")]
    pub arguments: Vec<String>,

    /// Set an environment variable for the script.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,
}

/// Arguments for `scriptbridge run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// The script and what to pass it.
    #[command(flatten)]
    pub script: ScriptArgs,

    /// Let the script write straight to this terminal instead of capturing its output.
    #[arg(long)]
    pub inherit: bool,
}

/// Arguments for `scriptbridge repl`.
#[derive(Args, Debug)]
pub struct ReplArgs {
    /// The script and what to pass it.
    #[command(flatten)]
    pub script: ScriptArgs,

    /// Give up on a reply after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub reply_timeout: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_arguments() {
        let cli = Cli::try_parse_from([
            "scriptbridge",
            "run",
            "job.py",
            "input=data.csv",
            "--env",
            "MODE=fast",
            "--inherit",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.script.script, PathBuf::from("job.py"));
                assert_eq!(args.script.arguments, vec!["input=data.csv"]);
                assert_eq!(args.script.env, vec!["MODE=fast"]);
                assert!(args.inherit);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scriptbridge",
            "repl",
            "server.py",
            "--interpreter",
            "python3 -u",
            "--reply-timeout",
            "500",
        ])
        .unwrap();

        assert_eq!(cli.interpreter.as_deref(), Some("python3 -u"));
        match cli.command {
            Commands::Repl(args) => assert_eq!(args.reply_timeout, Some(500)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
