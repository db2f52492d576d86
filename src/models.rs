// src/models.rs

//! Plain data types shared by the controller, the config loader and the CLI.

use crate::constants::{DEFAULT_INTERPRETER, DEFAULT_SETTLE_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Where the child's stdout goes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Capture stdout so it can be returned to the caller.
    #[default]
    Pipe,
    /// Pass stdout straight through to the host's own stdout. Nothing is captured.
    Inherit,
}

/// Observable lifecycle of a controller's process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// No process has been started yet.
    Unstarted,
    /// The process is alive.
    Running,
    /// The process exited with this code.
    Finished(i32),
}

/// Launch options as written in `config.toml`. Every key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchOptions {
    /// Interpreter command line, e.g. `"python3 -u"`.
    pub interpreter: String,
    /// Capture stdout (`"pipe"`) or pass it through (`"inherit"`).
    pub output_mode: OutputMode,
    /// Embed the captured stderr in the failure message.
    pub cause_in_message: bool,
    /// Pause after start and after each interactive command, in milliseconds.
    pub settle_delay_ms: u64,
    /// Upper bound for reading an interactive reply. Unset means block until a line arrives.
    pub reply_timeout_ms: Option<u64>,
    /// Extra variables layered over the inherited environment.
    pub env: HashMap<String, String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            output_mode: OutputMode::default(),
            cause_in_message: true,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            reply_timeout_ms: None,
            env: HashMap::new(),
        }
    }
}

impl LaunchOptions {
    /// `settle_delay_ms` as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// `reply_timeout_ms` as a `Duration`, if set.
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_ms.map(Duration::from_millis)
    }
}
