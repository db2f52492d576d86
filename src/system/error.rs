// src/system/error.rs

//! Errors reported by the controller, and the translation of a failed exit
//! into a [`PythonFailure`].

use crate::core::config_loader::ConfigError;
use std::fmt;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

/// Everything a controller operation can fail with.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script path is missing, not a regular file, or not executable.
    #[error("Invalid script file '{path}': {reason}")]
    InvalidFile {
        /// The path as given by the caller.
        path: String,
        /// What the check found wrong.
        reason: String,
    },
    /// `start` was called while the previous process is still alive.
    #[error("The script is already running.")]
    AlreadyRunning,
    /// There is no process to talk to, or it has exited cleanly.
    #[error("No script process is running.")]
    NoProcess,
    /// An exit code was asked for before the process finished.
    #[error("The script is still running.")]
    StillRunning,
    /// The script exited with a non-zero code.
    #[error("{0}")]
    PythonFailure(PythonFailure),
    /// The script did not print a reply line within the configured bound.
    #[error("No reply from the script within {0:?}.")]
    ReplyTimeout(Duration),
    /// The session's worker went away before answering.
    #[error("The interactive worker stopped before answering.")]
    ChannelClosed,
    /// Spawning the process or talking over its pipes failed.
    #[error("Process I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The launch options could not be loaded or applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScriptError {
    /// The failure details, when the script itself exited abnormally.
    pub fn as_failure(&self) -> Option<&PythonFailure> {
        match self {
            Self::PythonFailure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A script that finished with a non-zero exit code, with its captured stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonFailure {
    code: i32,
    stderr: String,
    cause_in_message: bool,
}

impl PythonFailure {
    /// A failure for exit `code`. `cause_in_message` decides whether `Display` includes `stderr`.
    pub fn new(code: i32, stderr: impl Into<String>, cause_in_message: bool) -> Self {
        Self {
            code,
            stderr: stderr.into(),
            cause_in_message,
        }
    }

    /// The script's exit code; `-1` when it was killed by a signal.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The script's stderr, lines joined with `\n`. Always available, whether or
    /// not it is part of the message.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

impl fmt::Display for PythonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Python script finished with a non-zero exit code {}",
            self.code
        )?;
        if self.cause_in_message {
            write!(f, "\n{}", self.stderr)?;
        }
        Ok(())
    }
}

/// Turns a non-zero exit into a `ScriptError::PythonFailure`.
pub fn translate_exit(code: i32, stderr: String, cause_in_message: bool) -> ScriptError {
    ScriptError::PythonFailure(PythonFailure::new(code, stderr, cause_in_message))
}

/// Exit code of a finished child; signal terminations map to `SIGNAL_EXIT_CODE`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status
        .code()
        .unwrap_or(crate::constants::SIGNAL_EXIT_CODE)
}

/// The child's stderr, drained concurrently by a reader thread so the script
/// can never block on a full pipe. The text is collected once, after exit.
#[derive(Debug)]
pub(crate) struct StderrCapture {
    drain: Option<JoinHandle<String>>,
    text: String,
}

pub(crate) type SharedStderr = Arc<Mutex<StderrCapture>>;

impl StderrCapture {
    pub(crate) fn new(drain: JoinHandle<String>) -> Self {
        Self {
            drain: Some(drain),
            text: String::new(),
        }
    }

    /// Joins the reader on first use and returns the captured text.
    /// Must only be called once the child has exited, or it blocks until stderr closes.
    pub(crate) fn text(&mut self) -> &str {
        if let Some(drain) = self.drain.take() {
            match drain.join() {
                Ok(text) => self.text = text,
                Err(_) => log::warn!("The stderr reader thread panicked; stderr is lost."),
            }
        }
        &self.text
    }
}

/// Builds the failure for `code`, consuming the session's stderr if not yet done.
pub(crate) fn failure_from(code: i32, stderr: &SharedStderr, cause_in_message: bool) -> ScriptError {
    let mut capture = stderr.lock().unwrap_or_else(PoisonError::into_inner);
    translate_exit(code, capture.text().to_string(), cause_in_message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_embeds_stderr_by_default() {
        let err = translate_exit(2, "Traceback\nSome exception".to_string(), true);
        assert_eq!(
            err.to_string(),
            "Python script finished with a non-zero exit code 2\nTraceback\nSome exception"
        );
    }

    #[test]
    fn test_message_excludes_stderr_when_disabled() {
        let err = translate_exit(1, "Some exception".to_string(), false);
        assert_eq!(
            err.to_string(),
            "Python script finished with a non-zero exit code 1"
        );

        let failure = err.as_failure().unwrap();
        assert_eq!(failure.code(), 1);
        assert!(failure.stderr().ends_with("Some exception"));
    }

    #[test]
    fn test_stderr_capture_joins_reader_once() {
        let drain = std::thread::spawn(|| "Traceback\nSome exception".to_string());
        let mut capture = StderrCapture::new(drain);

        assert_eq!(capture.text(), "Traceback\nSome exception");
        assert_eq!(capture.text(), "Traceback\nSome exception");
        assert!(capture.drain.is_none());
    }

    #[test]
    fn test_failure_from_uses_captured_stderr() {
        let drain = std::thread::spawn(|| "Some exception".to_string());
        let stderr: SharedStderr = Arc::new(Mutex::new(StderrCapture::new(drain)));

        let err = failure_from(5, &stderr, false);
        let failure = err.as_failure().unwrap();
        assert_eq!(failure.code(), 5);
        assert_eq!(failure.stderr(), "Some exception");
    }

    #[test]
    fn test_as_failure_only_matches_failures() {
        assert!(ScriptError::NoProcess.as_failure().is_none());
        assert!(ScriptError::StillRunning.as_failure().is_none());
    }
}
