// src/cli/handlers/run.rs

//! `scriptbridge run`: batch mode.

use crate::{
    cli::{Cli, RunArgs, handlers::commons},
    models::OutputMode,
};
use anyhow::Result;

/// Entry point for `scriptbridge run`: executes the script and prints every captured line.
pub fn handle(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut options = commons::resolve_options(cli)?;
    if args.inherit {
        options.output_mode = OutputMode::Inherit;
    }

    let mut controller = commons::build_controller(&options, &args.script)?;
    match controller.execute()? {
        Some(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        None => log::debug!("Output was passed through, nothing captured."),
    }

    let code = controller.exit_code()?;
    log::info!("{} exited with code {}", controller.script().display(), code);
    Ok(())
}
