//! # Command Error Handling
//!
//! Maps the crate's error types to messages and hints for the
//! `identity-register` binary using the handled crate.

use handled::Handle;

use crate::{ApplyFailure, LoadError, ParseError, RegisterError};

/// User-friendly error information that can be extracted from various error types
#[derive(Debug, Clone)]
pub struct UserError {
    /// The main error message to display to the user
    pub message: String,
    /// Optional usage hint to help the user correct the error
    pub usage_hint: Option<String>,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Implements Handle<UserError> for itself to allow extraction
impl Handle<UserError> for UserError {
    fn handle(&self) -> Option<UserError> {
        Some(self.clone())
    }
}

impl Handle<UserError> for RegisterError {
    fn handle(&self) -> Option<UserError> {
        let usage_hint = match self {
            RegisterError::Command(err) => match err.exit_code {
                None => Some(
                    "The administration tool could not be started. Check --tool and PATH."
                        .to_string(),
                ),
                Some(_) if err.stderr.contains("401") || err.stderr.contains("Unauthorized") => {
                    Some(
                        "Authentication failed. Check service_token and service_endpoint."
                            .to_string(),
                    )
                }
                Some(_) => None,
            },
            RegisterError::Parse(_) => Some(
                "The tool printed output that is not a table. Inspect it with parse-table."
                    .to_string(),
            ),
            RegisterError::MissingAttribute {
                kind: "configuration",
                ..
            } => Some("Set auth_uri or service_endpoint in the configuration.".to_string()),
            RegisterError::MissingAttribute { kind, .. } => Some(format!(
                "Add the attribute to the {} declaration in the manifest.",
                kind
            )),
            RegisterError::Unresolved { kind, .. } => Some(format!(
                "Declare the {} earlier in the manifest so it is created first.",
                kind
            )),
            RegisterError::MissingField { .. } => None,
        };
        Some(UserError {
            message: self.to_string(),
            usage_hint,
        })
    }
}

impl Handle<UserError> for ParseError {
    fn handle(&self) -> Option<UserError> {
        Some(UserError {
            message: format!("Table parsing error: {}", self),
            usage_hint: Some(
                "Every row must have as many |-separated cells as the header".to_string(),
            ),
        })
    }
}

impl Handle<UserError> for LoadError {
    fn handle(&self) -> Option<UserError> {
        let usage_hint = match self {
            LoadError::Io { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => {
                    Some("The specified file was not found. Check the file path.".to_string())
                }
                std::io::ErrorKind::PermissionDenied => {
                    Some("Permission denied. Check file permissions.".to_string())
                }
                _ => None,
            },
            LoadError::Syntax { .. } => Some(
                "Each entry under 'objects' needs a 'kind' of tenant, service, endpoint, role, user, role_grant or ec2_credential"
                    .to_string(),
            ),
        };
        Some(UserError {
            message: self.to_string(),
            usage_hint,
        })
    }
}

impl Handle<UserError> for ApplyFailure {
    fn handle(&self) -> Option<UserError> {
        let inner = self.error.handle()?;
        let applied = self.completed.entries.len();
        let mut message = self.to_string();
        if applied > 0 {
            message.push_str(&format!(" ({} objects reconciled before the failure)", applied));
        }
        Some(UserError {
            message,
            usage_hint: inner.usage_hint,
        })
    }
}

/// Enhanced error formatting for CLI output
pub fn format_cli_error<E>(error: &E) -> String
where
    E: Handle<UserError> + std::fmt::Display,
{
    if let Some(user_error) = error.handle() {
        let mut output = format!("Error: {}", user_error.message);
        if let Some(hint) = user_error.usage_hint {
            output.push_str(&format!("\nHint: {}", hint));
        }
        output
    } else {
        format!("Error: {}", error)
    }
}
