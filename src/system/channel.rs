// src/system/channel.rs

//! The interactive side of a session.
//!
//! A single worker thread owns the child's stdin and the queue of stdout lines.
//! Every operation that touches those streams (an interactive exchange or the
//! batch collection at exit) is a `Job` on the worker's queue, so two calls can
//! never interleave their writes and reads on the pipe pair.
//!
//! stdout is read by a separate pump thread that forwards complete lines into
//! an in-memory queue. This is what lets the worker discard the backlog without
//! blocking before it sends the next command. stderr has its own reader thread
//! that keeps the pipe empty for as long as the child lives.

use crate::{
    constants::{EXIT_POLL_INTERVAL, THREAD_NAME_PREFIX},
    system::error::{ScriptError, SharedStderr, exit_code_of, failure_from},
};
use std::{
    future::Future,
    io::{self, BufRead, BufReader, Read, Write},
    pin::Pin,
    process::{Child, ChildStderr, ChildStdin, ChildStdout},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        mpsc::{self, RecvTimeoutError},
    },
    task::{Context, Poll},
    thread::{self, JoinHandle},
    time::Duration,
};
use tokio::sync::oneshot;
use uuid::Uuid;

pub(crate) type SharedChild = Arc<Mutex<Child>>;

pub(crate) fn lock_child(child: &SharedChild) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timing and reporting knobs copied into each session at start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChannelSettings {
    pub(crate) settle_delay: Duration,
    pub(crate) reply_timeout: Option<Duration>,
    pub(crate) cause_in_message: bool,
}

/// The streams the worker operates on. `stdout` is `None` in passthrough mode.
#[derive(Debug)]
pub(crate) struct StreamSet {
    pub(crate) stdin: ChildStdin,
    pub(crate) stdout: Option<mpsc::Receiver<String>>,
}

enum Job {
    Tell {
        command: String,
        reply: oneshot::Sender<Result<String, ScriptError>>,
    },
    // Answered over a std channel: the caller blocks, possibly on a runtime thread.
    Collect {
        reply: mpsc::Sender<Result<Option<Vec<String>>, ScriptError>>,
    },
}

/// Handle to a submitted interactive call.
///
/// Await it from async code, or call [`Reply::wait`] from a plain thread.
#[must_use = "a Reply does nothing unless awaited or waited on"]
#[derive(Debug)]
pub struct Reply<T = String> {
    rx: oneshot::Receiver<Result<T, ScriptError>>,
}

impl<T> Reply<T> {
    /// Blocks the current thread until the worker answers.
    ///
    /// # Panics
    /// Panics when called from inside an async runtime; use `.await` there.
    pub fn wait(self) -> Result<T, ScriptError> {
        self.rx
            .blocking_recv()
            .unwrap_or(Err(ScriptError::ChannelClosed))
    }
}

impl<T> Future for Reply<T> {
    type Output = Result<T, ScriptError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ScriptError::ChannelClosed)))
    }
}

/// Front end of the worker thread. Dropping it lets the worker finish its queue and exit.
#[derive(Debug)]
pub(crate) struct InteractiveChannel {
    jobs: mpsc::Sender<Job>,
}

impl InteractiveChannel {
    pub(crate) fn open(
        session_id: Uuid,
        child: SharedChild,
        stderr: SharedStderr,
        streams: StreamSet,
        settings: ChannelSettings,
    ) -> io::Result<Self> {
        let (jobs, queue) = mpsc::channel();
        let worker = Worker {
            session_id,
            child,
            stderr,
            streams,
            settings,
        };
        thread::Builder::new()
            .name(format!("{}-worker", THREAD_NAME_PREFIX))
            .spawn(move || worker.run(queue))?;
        Ok(Self { jobs })
    }

    /// Queues one command/reply exchange.
    pub(crate) fn tell(&self, command: String) -> Reply {
        let (reply, rx) = oneshot::channel();
        // A failed send drops the sender, which resolves the Reply as ChannelClosed.
        let _ = self.jobs.send(Job::Tell { command, reply });
        Reply { rx }
    }

    /// Waits, behind any queued exchanges, for the child to exit and gathers the rest of stdout.
    /// Safe to call from a thread that is driving an async runtime.
    pub(crate) fn collect(&self) -> Result<Option<Vec<String>>, ScriptError> {
        let (reply, rx) = mpsc::channel();
        let _ = self.jobs.send(Job::Collect { reply });
        rx.recv().unwrap_or(Err(ScriptError::ChannelClosed))
    }
}

struct Worker {
    session_id: Uuid,
    child: SharedChild,
    stderr: SharedStderr,
    streams: StreamSet,
    settings: ChannelSettings,
}

impl Worker {
    fn run(mut self, queue: mpsc::Receiver<Job>) {
        log::trace!("[{}] worker started", self.session_id);
        for job in queue {
            match job {
                Job::Tell { command, reply } => {
                    let _ = reply.send(self.exchange(&command));
                }
                Job::Collect { reply } => {
                    let _ = reply.send(self.collect());
                }
            }
        }
        log::trace!("[{}] worker stopped", self.session_id);
    }

    fn exchange(&mut self, command: &str) -> Result<String, ScriptError> {
        if let Some(stdout) = &self.streams.stdout {
            for stale in stdout.try_iter() {
                log::trace!("[{}] discarding backlog line: {}", self.session_id, stale);
            }
        }

        if let Err(e) = self.send_line(command) {
            return Err(self.exited_error()?.unwrap_or(ScriptError::Io(e)));
        }

        thread::sleep(self.settings.settle_delay);

        let reply = match &self.streams.stdout {
            Some(stdout) => self.read_reply(stdout)?,
            None => String::new(),
        };
        log::trace!("[{}] {:?} -> {:?}", self.session_id, command, reply);

        if let Some(code) = self.exit_code()? {
            if code != 0 {
                return Err(self.failure(code));
            }
        }
        Ok(reply)
    }

    fn send_line(&mut self, command: &str) -> io::Result<()> {
        let stdin = &mut self.streams.stdin;
        stdin.write_all(command.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()
    }

    fn read_reply(&self, stdout: &mpsc::Receiver<String>) -> Result<String, ScriptError> {
        let line = match self.settings.reply_timeout {
            Some(timeout) => match stdout.recv_timeout(timeout) {
                Ok(line) => Some(line),
                Err(RecvTimeoutError::Timeout) => return Err(ScriptError::ReplyTimeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => stdout.recv().ok(),
        };

        match line {
            Some(line) => Ok(line),
            // stdout closed before a reply: the script is exiting.
            None => match self.await_exit()? {
                0 => Err(ScriptError::NoProcess),
                code => Err(self.failure(code)),
            },
        }
    }

    fn collect(&mut self) -> Result<Option<Vec<String>>, ScriptError> {
        let code = self.await_exit()?;
        log::debug!("[{}] script exited with code {}", self.session_id, code);
        if code != 0 {
            return Err(self.failure(code));
        }
        Ok(self
            .streams
            .stdout
            .as_ref()
            .map(|stdout| stdout.iter().collect()))
    }

    fn exit_code(&self) -> Result<Option<i32>, ScriptError> {
        let status = lock_child(&self.child).try_wait()?;
        Ok(status.map(exit_code_of))
    }

    /// Polls until the child exits. The child lock is only held for each check.
    fn await_exit(&self) -> Result<i32, ScriptError> {
        loop {
            if let Some(code) = self.exit_code()? {
                return Ok(code);
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }

    /// The error describing an already-exited child, if it has exited.
    fn exited_error(&self) -> Result<Option<ScriptError>, ScriptError> {
        Ok(self.exit_code()?.map(|code| match code {
            0 => ScriptError::NoProcess,
            code => self.failure(code),
        }))
    }

    fn failure(&self, code: i32) -> ScriptError {
        failure_from(code, &self.stderr, self.settings.cause_in_message)
    }
}

/// Starts the thread that forwards stdout lines (without terminators) into a queue.
/// The queue disconnects once stdout reaches end-of-stream.
pub(crate) fn spawn_stdout_pump(
    session_id: Uuid,
    stdout: ChildStdout,
) -> io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(format!("{}-stdout", THREAD_NAME_PREFIX))
        .spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&raw);
                        let line = line.trim_end_matches(['\n', '\r']).to_string();
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("[{}] failed to read script stdout: {}", session_id, e);
                        break;
                    }
                }
            }
            log::trace!("[{}] stdout closed", session_id);
        })?;
    Ok(rx)
}

/// Starts the thread that reads stderr to end-of-stream while the child runs.
/// Joining it yields the text with lines joined by `\n`.
pub(crate) fn spawn_stderr_drain(
    session_id: Uuid,
    mut stderr: ChildStderr,
) -> io::Result<JoinHandle<String>> {
    thread::Builder::new()
        .name(format!("{}-stderr", THREAD_NAME_PREFIX))
        .spawn(move || {
            let mut raw = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut raw) {
                log::warn!("[{}] failed to read script stderr: {}", session_id, e);
            }
            log::trace!("[{}] stderr closed after {} bytes", session_id, raw.len());
            String::from_utf8_lossy(&raw)
                .lines()
                .collect::<Vec<_>>()
                .join("\n")
        })
}
