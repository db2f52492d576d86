//! # Config Loader
//!
//! Locates and parses the `config.toml` launch options, and turns the textual
//! pieces of those options (interpreter command line, environment values) into
//! the concrete values the launcher needs.
//!
//! Lookup order:
//! 1. An explicit path given by the caller (must exist).
//! 2. `<system config dir>/scriptbridge/config.toml`, if present.
//! 3. Built-in defaults.
//!
//! `SCRIPTBRIDGE_INTERPRETER` overrides the interpreter in every case.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, INTERPRETER_ENV_VAR};
use crate::models::LaunchOptions;
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Failures while loading or applying launch options.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The options file exists but could not be read.
    #[error("Could not read config file '{path}': {source}")]
    Read {
        /// The file that was being read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The options file is not valid TOML or has unknown keys.
    #[error("Failed to parse launch options: {0}")]
    Parse(#[from] toml::de::Error),
    /// The interpreter command line has unbalanced quotes.
    #[error("Interpreter command '{0}' could not be parsed.")]
    InterpreterParse(String),
    /// The interpreter command line is empty.
    #[error("No interpreter specified.")]
    EmptyInterpreter,
    /// A `~` or `$VAR` reference could not be expanded.
    #[error("Failed to expand '{value}': {reason}")]
    Expansion {
        /// The text being expanded.
        value: String,
        /// Why expansion failed.
        reason: String,
    },
}

/// Returns the default location of the options file, if the system has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

/// Loads launch options following the lookup order described in the module docs.
pub fn load_options(explicit: Option<&Path>) -> Result<LaunchOptions, ConfigError> {
    let mut options = match explicit {
        Some(path) => load_options_from(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => load_options_from(&path)?,
            None => {
                log::debug!("No config file found, using default launch options.");
                LaunchOptions::default()
            }
        },
    };

    if let Ok(interpreter) = env::var(INTERPRETER_ENV_VAR) {
        if !interpreter.trim().is_empty() {
            log::debug!(
                "Interpreter overridden by {}: '{}'",
                INTERPRETER_ENV_VAR,
                interpreter
            );
            options.interpreter = interpreter;
        }
    }

    Ok(options)
}

/// Reads and parses a single options file.
pub fn load_options_from(path: &Path) -> Result<LaunchOptions, ConfigError> {
    log::debug!("Loading launch options from '{}'", path.display());
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_options(&content)
}

/// Parses options from TOML text. Missing keys take their defaults.
pub fn parse_options(content: &str) -> Result<LaunchOptions, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Splits an interpreter command line into program and leading arguments.
/// The program part has `~` and environment variables expanded.
pub fn parse_interpreter(command_line: &str) -> Result<Vec<String>, ConfigError> {
    let mut parts = shlex::split(command_line.trim())
        .ok_or_else(|| ConfigError::InterpreterParse(command_line.to_string()))?;
    let program = parts.first_mut().ok_or(ConfigError::EmptyInterpreter)?;
    *program = expand(program)?;
    Ok(parts)
}

/// Expands `~` and environment variables in every value of an `[env]` table.
pub fn expand_env_values(
    values: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ConfigError> {
    values
        .iter()
        .map(|(key, value)| Ok((key.clone(), expand(value)?)))
        .collect()
}

fn expand(value: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ConfigError::Expansion {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
