// src/constants.rs

//! Defaults and fixed names used across the crate.

use std::time::Duration;

/// The interpreter used when no other one is configured.
pub const DEFAULT_INTERPRETER: &str = "python";

/// Environment variable that overrides the configured interpreter command.
pub const INTERPRETER_ENV_VAR: &str = "SCRIPTBRIDGE_INTERPRETER";

/// The name of the directory holding scriptbridge configuration (inside the system config dir).
pub const CONFIG_DIR_NAME: &str = "scriptbridge";

/// The name of the launch options file (inside the config dir).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Milliseconds given to a freshly started child, and to each interactive command, before reading.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Interval between `try_wait` checks while waiting for a child to exit.
pub const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Exit code reported for a child that was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Prefix for the names of the threads spawned per session.
pub const THREAD_NAME_PREFIX: &str = "scriptbridge";
