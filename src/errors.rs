//! Error types for reconciliation operations.

use crate::{CommandError, ParseError};

/// Errors that abort the reconciliation of a single object.
///
/// Tool failures and malformed output are carried unchanged so the caller sees
/// exactly what the tool reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The administration tool exited unsuccessfully or could not be started.
    Command(CommandError),
    /// The tool produced tabular output that could not be parsed.
    Parse(ParseError),
    /// A descriptor is missing an attribute its create or update command requires.
    MissingAttribute {
        /// The object kind being reconciled.
        kind: &'static str,
        /// The attribute that was empty.
        attribute: &'static str,
    },
    /// An object this one refers to does not exist in the identity service.
    Unresolved {
        /// The kind of the referenced object.
        kind: &'static str,
        /// The column used to look it up.
        key: &'static str,
        /// The value that was looked up.
        value: String,
    },
    /// The tool reported success but left out a field of its result.
    MissingField {
        /// The verb whose output was incomplete.
        verb: &'static str,
        /// The field that was absent.
        field: &'static str,
    },
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command(err) => write!(f, "{}", err),
            Self::Parse(err) => write!(f, "{}", err),
            Self::MissingAttribute { kind, attribute } => {
                write!(f, "{} is missing required attribute '{}'", kind, attribute)
            }
            Self::Unresolved { kind, key, value } => {
                write!(f, "no {} with {} '{}' exists", kind, key, value)
            }
            Self::MissingField { verb, field } => {
                write!(f, "{} output did not contain '{}'", verb, field)
            }
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Command(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommandError> for RegisterError {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<ParseError> for RegisterError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

/// Errors that can occur while loading a manifest or configuration file.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io {
        /// The path that was being read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The file was not valid YAML or did not match the expected schema.
    Syntax {
        /// The path that was being parsed.
        path: String,
        /// What the YAML parser reported.
        message: String,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {}", path, source),
            Self::Syntax { path, message } => write!(f, "failed to parse {}: {}", path, message),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Syntax { .. } => None,
        }
    }
}

impl LoadError {
    pub(crate) fn syntax(path: &str, err: serde_yml::Error) -> Self {
        Self::Syntax {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}
