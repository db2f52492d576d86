// src/cli/handlers/commons.rs

//! Shared setup for the handlers: options lookup and controller construction.

use crate::{
    cli::{Cli, ScriptArgs},
    core::{arguments::ArgumentMap, config_loader},
    models::LaunchOptions,
    system::controller::ScriptController,
};
use anyhow::{Context, Result, anyhow};

/// Resolves the launch options for this invocation. `--interpreter` wins over the config file.
pub fn resolve_options(cli: &Cli) -> Result<LaunchOptions> {
    let mut options = config_loader::load_options(cli.config.as_deref())
        .context("Could not load launch options")?;
    if let Some(interpreter) = &cli.interpreter {
        options.interpreter = interpreter.clone();
    }
    Ok(options)
}

/// Builds a controller for the script described by `args`.
pub fn build_controller(options: &LaunchOptions, args: &ScriptArgs) -> Result<ScriptController> {
    let mut controller = ScriptController::with_options(&args.script, options)?;

    let arguments = args
        .arguments
        .iter()
        .map(|pair| parse_pair(pair))
        .collect::<Result<ArgumentMap>>()?;
    controller.set_arguments(&arguments);

    for pair in &args.env {
        let (key, value) = parse_pair(pair)?;
        controller.environment_mut().insert(key, value);
    }

    log::debug!("Prepared invocation: {:?}", controller.invocation());
    Ok(controller)
}

/// Splits `KEY=VALUE` at the first `=`.
pub fn parse_pair(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", pair))?;
    if key.is_empty() {
        return Err(anyhow!("Missing key in '{}'", pair));
    }
    Ok((key.to_string(), value.to_string()))
}
