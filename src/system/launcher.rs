// src/system/launcher.rs

//! Script validation and process spawning.

use crate::{
    constants::DEFAULT_INTERPRETER,
    core::{arguments::ArgumentMap, config_loader::ConfigError},
    models::OutputMode,
    system::error::ScriptError,
};
use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

/// Everything needed to spawn one run of a script: `<interpreter...> <script> [tokens...]`.
///
/// Changing any of it only affects processes spawned afterwards.
#[derive(Debug, Clone)]
pub struct Launcher {
    interpreter: Vec<String>,
    script: PathBuf,
    arguments: Vec<String>,
    output_mode: OutputMode,
    environment: HashMap<String, String>,
}

impl Launcher {
    /// Validates `script` and prepares a launcher with the default interpreter,
    /// no arguments, captured output and a copy of the host environment.
    ///
    /// # Errors
    /// `ScriptError::InvalidFile` when the script fails validation.
    pub fn new(script: &Path) -> Result<Self, ScriptError> {
        let script = validate_script(script)?;
        Ok(Self {
            interpreter: vec![DEFAULT_INTERPRETER.to_string()],
            script,
            arguments: Vec::new(),
            output_mode: OutputMode::default(),
            environment: env::vars().collect(),
        })
    }

    /// Absolute path of the validated script.
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Where stdout of the next spawn goes.
    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Sets where stdout of the next spawn goes.
    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Replaces the interpreter command (program plus leading arguments).
    pub fn set_interpreter<I, S>(&mut self, command: I) -> Result<(), ScriptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command: Vec<String> = command.into_iter().map(Into::into).collect();
        if command.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::EmptyInterpreter.into());
        }
        self.interpreter = command;
        Ok(())
    }

    /// Replaces the script arguments. They persist across consecutive runs.
    pub fn set_arguments(&mut self, arguments: &ArgumentMap) {
        self.arguments = arguments.to_command_list();
    }

    /// The child's complete environment.
    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    /// Mutable access to the child's environment. Starts as a copy of the host's.
    pub fn environment_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.environment
    }

    /// The full command line a spawn would run, program first.
    pub fn invocation(&self) -> Vec<String> {
        let mut invocation = Vec::with_capacity(self.interpreter.len() + 1 + self.arguments.len());
        invocation.extend(self.interpreter.iter().cloned());
        invocation.push(self.script.to_string_lossy().into_owned());
        invocation.extend(self.arguments.iter().cloned());
        invocation
    }

    /// Spawns the script. stdin and stderr are always piped; stdout follows the output mode.
    pub fn spawn(&self) -> io::Result<Child> {
        let (program, leading_args) = self
            .interpreter
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty interpreter"))?;

        let stdout = match self.output_mode {
            OutputMode::Pipe => Stdio::piped(),
            OutputMode::Inherit => Stdio::inherit(),
        };

        log::debug!("Spawning: {:?}", self.invocation());
        Command::new(program)
            .args(leading_args)
            .arg(&self.script)
            .args(&self.arguments)
            .env_clear()
            .envs(&self.environment)
            .stdin(Stdio::piped())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
    }
}

/// Checks that `path` is an existing, executable regular file and returns its absolute form.
fn validate_script(path: &Path) -> Result<PathBuf, ScriptError> {
    let invalid = |reason: &str| ScriptError::InvalidFile {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    let metadata = fs::metadata(path).map_err(|_| invalid("file does not exist"))?;
    if !metadata.is_file() {
        return Err(invalid("not a regular file"));
    }
    if !is_executable(&metadata) {
        return Err(invalid("insufficient permissions to execute the script"));
    }

    dunce::canonicalize(path).map_err(|e| invalid(&e.to_string()))
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}
