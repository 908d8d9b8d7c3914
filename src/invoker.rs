//! # Command Invoker
//!
//! Builds the argument vector and environment for one keystone sub-command and
//! runs it through a [`CommandExecutor`].
//!
//! ```text
//! keystone [--insecure] [subject flags] <verb> [--key value | --flag | positional]...
//! ```
//!
//! Options render in the order they were added. A `true` flag renders as the
//! bare switch, `false` renders as `--key false`, and an option with an empty
//! key is a positional value. Standard output is handed back untouched.
//!
//! Commands run as a user or an admin never see the service token variables,
//! even when the parent process carries them, because the tool prefers token
//! authentication whenever they are present.

use std::sync::Arc;

use tracing::debug;

use crate::{CommandExecutor, Environment, RegisterConfig};

/// Environment variable carrying the service endpoint for token authentication.
pub const SERVICE_ENDPOINT_VAR: &str = "OS_SERVICE_ENDPOINT";
/// Environment variable carrying the bootstrap service token.
pub const SERVICE_TOKEN_VAR: &str = "OS_SERVICE_TOKEN";

/// The value of a single command option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A textual value rendered after the switch.
    Text(String),
    /// A boolean switch.
    Flag(bool),
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Command options in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<(String, OptionValue)>);

impl Options {
    /// Creates an empty option list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `--key value`, replacing the value in place if `key` is already set.
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Adds `--key value` only when a value is present.
    pub fn with_optional(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Adds a positional value.
    pub fn positional(self, value: impl Into<OptionValue>) -> Self {
        self.with("", value)
    }

    /// Iterates over the options in the order they render.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns true if no options were added.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, key: &str, value: OptionValue) {
        match self.0.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    fn render(&self, argv: &mut Vec<String>) {
        for (key, value) in &self.0 {
            if !key.is_empty() {
                argv.push(format!("--{}", key));
            }
            match value {
                OptionValue::Text(text) => argv.push(text.clone()),
                OptionValue::Flag(true) if !key.is_empty() => {}
                OptionValue::Flag(flag) => argv.push(flag.to_string()),
            }
        }
    }
}

/// A username/password pair scoped to a tenant, used to authenticate a command.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User to authenticate as.
    pub username: String,
    /// That user's password.
    pub password: String,
    /// Tenant to scope the token to.
    pub tenant_name: String,
    /// Identity endpoint to authenticate against.
    pub auth_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tenant_name", &self.tenant_name)
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

/// Whose authority a command runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// The bootstrap service token from the pass-through environment.
    Service,
    /// The declared user's own password.
    User(Credentials),
    /// An administrative user, for commands that need an admin-scoped token.
    Admin(Credentials),
}

impl Subject {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Subject::Service => "service",
            Subject::User(_) => "user",
            Subject::Admin(_) => "admin",
        }
    }
}

/// The tool exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    /// The sub-command that failed.
    pub verb: String,
    /// Exit status, `None` if the tool could not be started or was killed.
    pub exit_code: Option<i32>,
    /// What the tool printed on standard output.
    pub stdout: String,
    /// What the tool printed on standard error.
    pub stderr: String,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(
                f,
                "{} failed (exit {}): {}",
                self.verb,
                code,
                self.stderr.trim()
            ),
            None => write!(f, "{} failed: {}", self.verb, self.stderr.trim()),
        }
    }
}

impl std::error::Error for CommandError {}

/// Runs keystone sub-commands.
#[derive(Clone)]
pub struct CommandInvoker {
    executor: Arc<dyn CommandExecutor>,
    tool: String,
    insecure: bool,
    service_endpoint: Option<String>,
    service_token: Option<String>,
    auth_uri: Option<String>,
}

impl CommandInvoker {
    /// Creates an invoker that runs the tool named in `config` through `executor`.
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &RegisterConfig) -> Self {
        Self {
            executor,
            tool: config.tool.clone(),
            insecure: config.insecure,
            service_endpoint: config.service_endpoint.clone(),
            service_token: config.service_token.clone(),
            auth_uri: config.auth_uri().map(str::to_string),
        }
    }

    /// The identity endpoint users authenticate against, if one is configured.
    pub fn auth_uri(&self) -> Option<&str> {
        self.auth_uri.as_deref()
    }

    /// Builds the argument vector and environment for a command without running it.
    pub fn command_line(
        &self,
        verb: &str,
        options: &Options,
        subject: &Subject,
    ) -> (Vec<String>, Environment) {
        let mut argv = vec![self.tool.clone()];
        if self.insecure {
            argv.push("--insecure".to_string());
        }

        let mut env = Environment::new();
        match subject {
            Subject::Service => {
                if let Some(endpoint) = &self.service_endpoint {
                    env.set(SERVICE_ENDPOINT_VAR, endpoint);
                }
                if let Some(token) = &self.service_token {
                    env.set(SERVICE_TOKEN_VAR, token);
                }
            }
            Subject::User(credentials) | Subject::Admin(credentials) => {
                env.remove(SERVICE_ENDPOINT_VAR);
                env.remove(SERVICE_TOKEN_VAR);
                argv.push("--os-username".to_string());
                argv.push(credentials.username.clone());
                argv.push("--os-password".to_string());
                argv.push(credentials.password.clone());
                argv.push("--os-tenant-name".to_string());
                argv.push(credentials.tenant_name.clone());
                argv.push(format!("--os-auth-url={}", credentials.auth_url));
            }
        }

        argv.push(verb.to_string());
        options.render(&mut argv);
        (argv, env)
    }

    /// Runs `verb` with `options` and returns what it printed on standard output.
    pub fn invoke(
        &self,
        verb: &str,
        options: &Options,
        subject: &Subject,
    ) -> Result<String, CommandError> {
        let (argv, env) = self.command_line(verb, options, subject);
        debug!(tool = %self.tool, verb, subject = subject.name(), "invoking");

        let output = self.executor.execute(&argv, &env).map_err(|e| CommandError {
            verb: verb.to_string(),
            exit_code: None,
            stdout: String::new(),
            stderr: format!("could not run {}: {}", self.tool, e),
        })?;

        if output.exit_code != Some(0) {
            return Err(CommandError {
                verb: verb.to_string(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}
