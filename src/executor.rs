//! Process execution seam.
//!
//! Everything that actually starts a process goes through [`CommandExecutor`],
//! so the rest of the crate can be driven by a fake tool in tests.

use std::collections::BTreeMap;
use std::process::Command;

/// What a finished process reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit status, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Everything the process wrote to standard output.
    pub stdout: String,
    /// Everything the process wrote to standard error.
    pub stderr: String,
}

impl ExecOutput {
    /// A successful run that printed `stdout`.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit code and error text.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Changes made to the inherited environment of a child process.
///
/// Removals apply first, so a variable both removed and set ends up set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Variables to set.
    pub set: BTreeMap<String, String>,
    /// Inherited variables the child must not see.
    pub remove: Vec<String>,
}

impl Environment {
    /// Leaves the inherited environment as it is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value` in the child.
    pub fn set(&mut self, name: &str, value: &str) {
        self.set.insert(name.to_string(), value.to_string());
    }

    /// Hides the inherited `name` from the child.
    pub fn remove(&mut self, name: &str) {
        self.set.remove(name);
        if !self.remove.iter().any(|existing| existing == name) {
            self.remove.push(name.to_string());
        }
    }

    /// The value `name` is set to, if it is set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.set.get(name).map(String::as_str)
    }

    /// Returns true if `name` is removed from the child.
    pub fn removes(&self, name: &str) -> bool {
        self.remove.iter().any(|existing| existing == name)
    }

    /// Returns true if nothing is set or removed.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

/// Runs an external program to completion.
///
/// `args[0]` names the program. `env` describes how the child's environment
/// differs from the inherited one.
pub trait CommandExecutor: Send + Sync {
    /// Runs `args` with `env` and waits for it to exit.
    fn execute(&self, args: &[String], env: &Environment) -> Result<ExecOutput, std::io::Error>;
}

/// Executes commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, args: &[String], env: &Environment) -> Result<ExecOutput, std::io::Error> {
        let (program, rest) = args.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argument vector")
        })?;
        let mut command = Command::new(program);
        command.args(rest);
        for name in &env.remove {
            command.env_remove(name);
        }
        let output = command.envs(&env.set).output()?;
        Ok(ExecOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
