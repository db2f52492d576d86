//! Run interpreter scripts as subprocesses, either to completion (batch mode)
//! or as long-lived workers queried one line at a time (interactive mode).

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use crate::core::arguments::ArgumentMap;
pub use crate::models::{LaunchOptions, OutputMode, ProcessState};
pub use crate::system::channel::Reply;
pub use crate::system::controller::ScriptController;
pub use crate::system::error::{PythonFailure, ScriptError};
