// src/cli/handlers/repl.rs

//! `scriptbridge repl`: interactive mode over stdin.

use crate::{
    cli::{Cli, ReplArgs, handlers::commons},
    system::error::ScriptError,
};
use anyhow::{Context, Result};
use colored::*;
use std::io::{self, BufRead, Write};

/// Entry point for `scriptbridge repl`.
///
/// Each line read from stdin is sent to the script and its one-line reply is printed.
/// The session ends when stdin is exhausted or the script exits cleanly; a script that
/// exits with an error ends it with that error.
pub fn handle(cli: &Cli, args: &ReplArgs) -> Result<()> {
    let mut options = commons::resolve_options(cli)?;
    if args.reply_timeout.is_some() {
        options.reply_timeout_ms = args.reply_timeout;
    }

    let mut controller = commons::build_controller(&options, &args.script)?;
    controller.start()?;
    eprintln!(
        "{} {}",
        "Connected to".dimmed(),
        controller.script().display().to_string().cyan()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("{} ", "›".blue());
        io::stderr().flush().ok();

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        let reply = match controller.tell(line) {
            Ok(pending) => pending.wait(),
            Err(e) => Err(e),
        };
        match reply {
            Ok(reply) => println!("{}", reply),
            Err(ScriptError::NoProcess) => {
                eprintln!("{}", "Script has exited.".dimmed());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    eprintln!();
    Ok(())
}
