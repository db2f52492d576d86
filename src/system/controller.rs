// src/system/controller.rs

//! The lifecycle controller: one script, at most one live process.

use crate::{
    core::{arguments::ArgumentMap, config_loader},
    models::{LaunchOptions, OutputMode, ProcessState},
    system::{
        channel::{self, ChannelSettings, InteractiveChannel, Reply, SharedChild, StreamSet},
        error::{ScriptError, SharedStderr, StderrCapture, exit_code_of, failure_from},
        launcher::Launcher,
    },
};
use scopeguard::ScopeGuard;
use std::{
    collections::HashMap,
    io,
    path::Path,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};
use uuid::Uuid;

/// Owns one script and at most one live process running it.
///
/// The process moves through `Unstarted -> Running -> Finished(code)`. It can be
/// driven in batch mode ([`execute`](Self::execute)) or interactively
/// ([`start`](Self::start) followed by [`tell`](Self::tell)). Dropping the
/// controller force-terminates a process that is still running.
///
/// `execute` and `wait_for_completion` block the calling thread until the process
/// exits. From async code, await the [`Reply`] returned by `tell` rather than
/// calling [`Reply::wait`].
#[derive(Debug)]
pub struct ScriptController {
    launcher: Launcher,
    settings: ChannelSettings,
    session: Option<Session>,
}

impl ScriptController {
    /// Creates a controller for `script` with default launch options.
    ///
    /// # Errors
    /// `ScriptError::InvalidFile` if the script does not exist or is not executable.
    pub fn new(script: impl AsRef<Path>) -> Result<Self, ScriptError> {
        Self::with_options(script, &LaunchOptions::default())
    }

    /// Creates a controller for `script` configured from `options`.
    ///
    /// # Errors
    /// `InvalidFile` for a bad script, `Config` for an unusable interpreter or env value.
    pub fn with_options(
        script: impl AsRef<Path>,
        options: &LaunchOptions,
    ) -> Result<Self, ScriptError> {
        let mut launcher = Launcher::new(script.as_ref())?;
        launcher.set_interpreter(config_loader::parse_interpreter(&options.interpreter)?)?;
        launcher.set_output_mode(options.output_mode);
        launcher
            .environment_mut()
            .extend(config_loader::expand_env_values(&options.env)?);

        Ok(Self {
            launcher,
            settings: ChannelSettings {
                settle_delay: options.settle_delay(),
                reply_timeout: options.reply_timeout(),
                cause_in_message: options.cause_in_message,
            },
            session: None,
        })
    }

    // --- Configuration (applies to processes started afterwards) ---

    /// Whether failures embed the script's stderr in their message. True by default.
    /// The stderr stays available through `PythonFailure::stderr` either way.
    pub fn set_cause_in_message(&mut self, cause_in_message: bool) {
        self.settings.cause_in_message = cause_in_message;
    }

    /// Whether the next process's stdout is captured or passed through to ours.
    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.launcher.set_output_mode(mode);
    }

    /// Sets the arguments the script is run with. They persist across consecutive runs.
    pub fn set_arguments(&mut self, arguments: &ArgumentMap) {
        self.launcher.set_arguments(arguments);
    }

    /// Replaces the interpreter command, program first.
    ///
    /// # Errors
    /// `Config` if `command` is empty.
    pub fn set_interpreter<I, S>(&mut self, command: I) -> Result<(), ScriptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.launcher.set_interpreter(command)
    }

    /// How long `start` and each `tell` pause to let the script catch up.
    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settings.settle_delay = delay;
    }

    /// Bounds how long `tell` waits for a reply line. `None` (the default) waits indefinitely.
    pub fn set_reply_timeout(&mut self, timeout: Option<Duration>) {
        self.settings.reply_timeout = timeout;
    }

    /// The output mode the next `start` will use.
    pub fn output_mode(&self) -> OutputMode {
        self.launcher.output_mode()
    }

    /// The environment the next process will receive.
    pub fn environment(&self) -> &HashMap<String, String> {
        self.launcher.environment()
    }

    /// The environment the next process will receive. Starts as a copy of the host's.
    pub fn environment_mut(&mut self) -> &mut HashMap<String, String> {
        self.launcher.environment_mut()
    }

    /// Absolute path of the script.
    pub fn script(&self) -> &Path {
        self.launcher.script()
    }

    /// The command line the next `start` would run.
    pub fn invocation(&self) -> Vec<String> {
        self.launcher.invocation()
    }

    // --- Lifecycle ---

    /// Runs the script to completion and returns its stdout lines.
    ///
    /// Returns `None` in passthrough mode. Never returns partial output on failure.
    pub fn execute(&mut self) -> Result<Option<Vec<String>>, ScriptError> {
        self.start()?;
        self.wait_for_completion()
    }

    /// Spawns the script and its interactive worker, then gives the child the
    /// settle delay to initialize before returning.
    ///
    /// # Errors
    /// `ScriptError::AlreadyRunning` if the previous process is still alive.
    pub fn start(&mut self) -> Result<(), ScriptError> {
        if let Some(session) = &self.session {
            if session.exit_code()?.is_none() {
                return Err(ScriptError::AlreadyRunning);
            }
        }
        // Release the finished session before spawning its replacement.
        self.session = None;

        let session = Session::spawn(&self.launcher, self.settings)?;
        log::debug!("[{}] script started (pid {})", session.id, session.pid);
        self.session = Some(session);

        thread::sleep(self.settings.settle_delay);
        Ok(())
    }

    /// Blocks until the process exits and returns the stdout lines not yet consumed.
    ///
    /// Waits behind any interactive call still queued on the worker.
    ///
    /// # Errors
    /// `NoProcess` if never started; `PythonFailure` on a non-zero exit.
    pub fn wait_for_completion(&self) -> Result<Option<Vec<String>>, ScriptError> {
        self.session()?.channel.collect()
    }

    /// Sends `command` as one line to the running script and returns a handle to its
    /// single-line reply. Calls are served one at a time, in submission order.
    ///
    /// # Errors
    /// Fails immediately with `PythonFailure` if the script already exited non-zero,
    /// or `NoProcess` if it exited cleanly or was never started.
    pub fn tell(&self, command: impl Into<String>) -> Result<Reply, ScriptError> {
        let session = self.session()?;
        if let Some(code) = session.exit_code()? {
            return Err(match code {
                0 => ScriptError::NoProcess,
                code => session.failure(code),
            });
        }
        Ok(session.channel.tell(command.into()))
    }

    /// Non-blocking liveness check.
    ///
    /// # Errors
    /// `NoProcess` if never started.
    pub fn has_finished(&self) -> Result<bool, ScriptError> {
        Ok(self.session()?.exit_code()?.is_some())
    }

    /// # Errors
    /// `NoProcess` if never started; `StillRunning` if the process is alive.
    pub fn exit_code(&self) -> Result<i32, ScriptError> {
        self.session()?
            .exit_code()?
            .ok_or(ScriptError::StillRunning)
    }

    /// Where the process is in its lifecycle.
    pub fn state(&self) -> Result<ProcessState, ScriptError> {
        Ok(match &self.session {
            None => ProcessState::Unstarted,
            Some(session) => match session.exit_code()? {
                None => ProcessState::Running,
                Some(code) => ProcessState::Finished(code),
            },
        })
    }

    /// Identifier of the current (or last) process, used in log lines.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|session| session.id)
    }

    /// OS process id of the current (or last) process.
    pub fn pid(&self) -> Option<u32> {
        self.session.as_ref().map(|session| session.pid)
    }

    fn session(&self) -> Result<&Session, ScriptError> {
        self.session.as_ref().ok_or(ScriptError::NoProcess)
    }
}

/// One spawned process with its streams and worker. Dropping it kills the process if alive.
#[derive(Debug)]
struct Session {
    id: Uuid,
    pid: u32,
    child: SharedChild,
    stderr: SharedStderr,
    cause_in_message: bool,
    channel: InteractiveChannel,
}

impl Session {
    fn spawn(launcher: &Launcher, settings: ChannelSettings) -> Result<Self, ScriptError> {
        let id = Uuid::new_v4();
        let child: SharedChild = Arc::new(Mutex::new(launcher.spawn()?));
        // Until the session is fully assembled, any early return must not leak the child.
        let guard = scopeguard::guard(Arc::clone(&child), |child| force_kill(id, &child));

        let (pid, stdin, stdout, stderr) = {
            let mut locked = channel::lock_child(&child);
            (
                locked.id(),
                locked.stdin.take(),
                locked.stdout.take(),
                locked.stderr.take(),
            )
        };
        let stdin = stdin.ok_or_else(|| missing_pipe("stdin"))?;
        let stderr = stderr.ok_or_else(|| missing_pipe("stderr"))?;
        let stderr: SharedStderr = Arc::new(Mutex::new(StderrCapture::new(
            channel::spawn_stderr_drain(id, stderr)?,
        )));
        let stdout = match stdout {
            Some(stdout) => Some(channel::spawn_stdout_pump(id, stdout)?),
            None => None,
        };

        let channel = InteractiveChannel::open(
            id,
            Arc::clone(&child),
            Arc::clone(&stderr),
            StreamSet { stdin, stdout },
            settings,
        )?;
        ScopeGuard::into_inner(guard);

        Ok(Self {
            id,
            pid,
            child,
            stderr,
            cause_in_message: settings.cause_in_message,
            channel,
        })
    }

    fn exit_code(&self) -> Result<Option<i32>, ScriptError> {
        let status = channel::lock_child(&self.child).try_wait()?;
        Ok(status.map(exit_code_of))
    }

    fn failure(&self, code: i32) -> ScriptError {
        failure_from(code, &self.stderr, self.cause_in_message)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        force_kill(self.id, &self.child);
    }
}

/// Kills and reaps the child if it is still alive. No graceful shutdown is attempted.
fn force_kill(id: Uuid, child: &SharedChild) {
    let mut child = channel::lock_child(child);
    match child.try_wait() {
        Ok(Some(_)) => {}
        Ok(None) => {
            log::debug!("[{}] killing script process (PID: {})", id, child.id());
            if let Err(e) = child.kill() {
                log::warn!("[{}] failed to kill script process {}: {}", id, child.id(), e);
            }
            child.wait().ok();
        }
        Err(e) => log::warn!("[{}] could not query script process: {}", id, e),
    }
}

fn missing_pipe(name: &str) -> ScriptError {
    ScriptError::Io(io::Error::other(format!("script {} was not captured", name)))
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::time::Instant;
    use tempfile::TempDir;

    // --- Helpers ---

    /// Writes an executable `sh` script into `dir`.
    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn controller(dir: &TempDir, name: &str, body: &str) -> ScriptController {
        let mut controller = ScriptController::new(script(dir, name, body)).unwrap();
        controller.set_interpreter(["sh"]).unwrap();
        controller
    }

    fn wait_until_finished(controller: &ScriptController) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !controller.has_finished().unwrap() {
            assert!(Instant::now() < deadline, "script did not finish in time");
            thread::sleep(Duration::from_millis(20));
        }
    }

    /// Runs `execute` on its own thread so a stuck script fails the test instead of hanging it.
    fn execute_within(
        mut controller: ScriptController,
        limit: Duration,
    ) -> Result<Option<Vec<String>>, ScriptError> {
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(controller.execute());
        });
        rx.recv_timeout(limit).expect("execute did not return in time")
    }

    /// Writes about 150 KiB to stderr, well past any OS pipe buffer, then exits with `code`.
    fn noisy_stderr(code: i32) -> String {
        format!(
            "i=0\nwhile [ $i -lt 3000 ]; do\n  echo '{}' >&2\n  i=$((i+1))\ndone\necho done\nexit {}",
            "x".repeat(50),
            code
        )
    }

    const ECHO_ONCE: &str = "read line\necho \"$line\"";
    const ECHO_LOOP: &str =
        "while read line; do\n  echo \"$line\"\n  if [ \"$line\" = stop ]; then exit 0; fi\ndone";
    const FAILING: &str = "echo 'partial output'\necho 'Traceback' >&2\necho 'Some exception' >&2\nexit 3";

    // --- Batch mode ---

    #[test]
    fn test_execute_returns_output_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "success.sh", "echo 'Success!'");

        let output = controller.execute().unwrap().unwrap();
        assert_eq!(output, vec!["Success!"]);
        assert_eq!(controller.exit_code().unwrap(), 0);
        assert_eq!(controller.state().unwrap(), ProcessState::Finished(0));
    }

    #[test]
    fn test_execute_failure_carries_stderr() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "error.sh", FAILING);

        let err = controller.execute().unwrap_err();
        let failure = err.as_failure().expect("expected a script failure");
        assert_eq!(failure.code(), 3);
        assert!(failure.stderr().ends_with("Some exception"));
        assert!(err.to_string().contains("Some exception"));
        assert_eq!(controller.exit_code().unwrap(), 3);
    }

    #[test]
    fn test_cause_can_be_kept_out_of_message() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "error.sh", FAILING);
        controller.set_cause_in_message(false);

        let err = controller.execute().unwrap_err();
        assert!(!err.to_string().contains("Some exception"));
        assert!(err.as_failure().unwrap().stderr().ends_with("Some exception"));
    }

    #[test]
    fn test_arguments_are_passed_as_quoted_tokens() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            &dir,
            "catch_args.sh",
            "echo \"argc=$#\"\nfor arg in \"$@\"; do echo \"$arg\"; done",
        );
        let arguments: ArgumentMap = [("Key1", "Val1"), ("Key2", "Val2"), ("Key 3", "Val 3")]
            .into_iter()
            .collect();
        controller.set_arguments(&arguments);

        let output = controller.execute().unwrap().unwrap();
        assert_eq!(output[0], "argc=3");
        for expected in ["\"Key1\"=\"Val1\"", "\"Key2\"=\"Val2\"", "\"Key 3\"=\"Val 3\""] {
            assert!(output.iter().any(|line| line == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_environment_mutation_reaches_script() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "environment.sh", "echo \"$SCRIPTBRIDGE_TEST\"");
        controller
            .environment_mut()
            .insert("SCRIPTBRIDGE_TEST".to_string(), "This is a test".to_string());

        assert_eq!(controller.execute().unwrap().unwrap(), vec!["This is a test"]);
    }

    #[test]
    fn test_large_stderr_does_not_stall_failing_script() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, "noisy.sh", &noisy_stderr(1));

        let err = execute_within(controller, Duration::from_secs(10)).unwrap_err();
        let failure = err.as_failure().expect("expected a script failure");
        assert_eq!(failure.code(), 1);
        assert_eq!(failure.stderr().lines().count(), 3000);
        assert!(failure.stderr().len() > 100_000);
    }

    #[test]
    fn test_large_stderr_does_not_stall_successful_script() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, "noisy.sh", &noisy_stderr(0));

        let output = execute_within(controller, Duration::from_secs(10)).unwrap();
        assert_eq!(output, Some(vec!["done".to_string()]));
    }

    #[tokio::test]
    async fn test_execute_from_async_context() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "success.sh", "echo 'Success!'");

        assert_eq!(controller.execute().unwrap().unwrap(), vec!["Success!"]);
        assert_eq!(controller.exit_code().unwrap(), 0);
    }

    #[test]
    fn test_output_mode_applies_to_next_start() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "success.sh", "echo 'Success!'");
        assert_eq!(controller.output_mode(), OutputMode::Pipe);

        controller.set_output_mode(OutputMode::Inherit);
        assert_eq!(controller.output_mode(), OutputMode::Inherit);
        assert_eq!(controller.execute().unwrap(), None);

        controller.set_output_mode(OutputMode::Pipe);
        assert_eq!(controller.execute().unwrap().unwrap(), vec!["Success!"]);
    }

    #[test]
    fn test_inherit_mode_captures_nothing() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "success.sh", "echo 'Success!'");
        controller.set_output_mode(OutputMode::Inherit);

        assert_eq!(controller.execute().unwrap(), None);
        assert_eq!(controller.exit_code().unwrap(), 0);
    }

    #[test]
    fn test_finished_controller_can_run_again() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "success.sh", "echo 'Success!'");

        assert!(controller.session_id().is_none());
        controller.execute().unwrap();
        let first = controller.session_id().unwrap();

        let second_run = controller.execute().unwrap().unwrap();
        assert_eq!(second_run, vec!["Success!"]);
        assert_ne!(controller.session_id(), Some(first));
    }

    // --- State machine ---

    #[test]
    fn test_operations_before_start_report_no_process() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir, "success.sh", "echo 'Success!'");

        assert_eq!(controller.state().unwrap(), ProcessState::Unstarted);
        assert!(matches!(controller.has_finished(), Err(ScriptError::NoProcess)));
        assert!(matches!(controller.exit_code(), Err(ScriptError::NoProcess)));
        assert!(matches!(
            controller.wait_for_completion(),
            Err(ScriptError::NoProcess)
        ));
        assert!(matches!(controller.tell("x"), Err(ScriptError::NoProcess)));
    }

    #[test]
    fn test_second_start_while_running_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "loop.sh", ECHO_LOOP);

        controller.start().unwrap();
        assert!(matches!(controller.start(), Err(ScriptError::AlreadyRunning)));
        assert_eq!(controller.state().unwrap(), ProcessState::Running);
    }

    #[test]
    fn test_exit_code_while_running() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "tell.sh", ECHO_ONCE);

        controller.start().unwrap();
        assert!(matches!(controller.exit_code(), Err(ScriptError::StillRunning)));
    }

    #[test]
    fn test_has_finished_tracks_exit() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "tell.sh", ECHO_ONCE);

        controller.start().unwrap();
        assert!(!controller.has_finished().unwrap());

        controller.tell("bla").unwrap().wait().unwrap();
        wait_until_finished(&controller);
        assert!(controller.has_finished().unwrap());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_drop_kills_running_process() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "sleepy.sh", "exec sleep 30");

        controller.start().unwrap();
        let pid = controller.pid().unwrap();
        assert!(Path::new(&format!("/proc/{}", pid)).exists());

        drop(controller);
        assert!(!Path::new(&format!("/proc/{}", pid)).exists());
    }

    // --- Interactive mode ---

    #[test]
    fn test_tell_echoes() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "tell.sh", ECHO_ONCE);

        controller.start().unwrap();
        assert_eq!(controller.tell("Test").unwrap().wait().unwrap(), "Test");
    }

    #[test]
    fn test_tell_discards_backlog() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            &dir,
            "banner.sh",
            "echo 'banner line 1'\necho 'banner line 2'\nread line\necho \"$line\"",
        );

        controller.start().unwrap();
        assert_eq!(controller.tell("reply").unwrap().wait().unwrap(), "reply");
    }

    #[tokio::test]
    async fn test_tell_calls_are_served_in_order() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "loop.sh", ECHO_LOOP);

        controller.start().unwrap();
        let hi = controller.tell("Hi").unwrap();
        let stop = controller.tell("stop").unwrap();

        assert_eq!(hi.await.unwrap(), "Hi");
        assert_eq!(stop.await.unwrap(), "stop");

        wait_until_finished(&controller);
        assert!(matches!(
            controller.tell("This should fail since the script has stopped."),
            Err(ScriptError::NoProcess)
        ));
    }

    #[test]
    fn test_tell_after_failure_reports_failure() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "error.sh", FAILING);

        controller.start().unwrap();
        wait_until_finished(&controller);

        let err = controller.tell("").unwrap_err();
        assert_eq!(err.as_failure().map(|f| f.code()), Some(3));
    }

    #[test]
    fn test_failure_during_tell_is_delivered_through_reply() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            &dir,
            "error_after_tell.sh",
            "read line\necho 'Some exception' >&2\nexit 2",
        );

        controller.start().unwrap();
        let err = controller.tell("test").unwrap().wait().unwrap_err();
        let failure = err.as_failure().expect("expected a script failure");
        assert_eq!(failure.code(), 2);
        assert!(failure.stderr().ends_with("Some exception"));
    }

    #[test]
    fn test_exit_right_after_reply_is_reported_as_failure() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            &dir,
            "reply_then_fail.sh",
            "read line\necho \"$line\"\necho 'Some exception' >&2\nexit 4",
        );

        controller.start().unwrap();
        let err = controller.tell("x").unwrap().wait().unwrap_err();
        let failure = err.as_failure().expect("expected a script failure");
        assert_eq!(failure.code(), 4);
        assert!(failure.stderr().ends_with("Some exception"));
    }

    #[test]
    fn test_reply_timeout() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "silent.sh", "read line\nexec sleep 30");
        controller.set_reply_timeout(Some(Duration::from_millis(200)));

        controller.start().unwrap();
        let result = controller.tell("anyone there?").unwrap().wait();
        assert!(matches!(result, Err(ScriptError::ReplyTimeout(_))));
    }

    #[test]
    fn test_wait_after_tell_returns_remaining_output() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            &dir,
            "tail.sh",
            "read line\necho \"$line\"\necho 'after 1'\necho 'after 2'",
        );

        controller.start().unwrap();
        let reply = controller.tell("first").unwrap();
        let rest = controller.wait_for_completion().unwrap().unwrap();

        assert_eq!(reply.wait().unwrap(), "first");
        assert_eq!(rest, vec!["after 1", "after 2"]);
    }

    #[test]
    fn test_tell_in_inherit_mode_returns_empty_reply() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(&dir, "loop.sh", ECHO_LOOP);
        controller.set_output_mode(OutputMode::Inherit);

        controller.start().unwrap();
        assert_eq!(controller.tell("Hi").unwrap().wait().unwrap(), "");
    }

    // --- Options ---

    #[test]
    fn test_with_options_applies_interpreter_and_env() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "environment.sh", "echo \"$GREETING\"");
        let mut options = LaunchOptions {
            interpreter: "sh".to_string(),
            settle_delay_ms: 10,
            ..LaunchOptions::default()
        };
        options
            .env
            .insert("GREETING".to_string(), "hello".to_string());

        let mut controller = ScriptController::with_options(&path, &options).unwrap();
        assert_eq!(controller.invocation()[0], "sh");
        assert_eq!(controller.execute().unwrap().unwrap(), vec!["hello"]);
    }
}
