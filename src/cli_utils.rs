use std::process;
use std::str::FromStr;

use handled::Handle;

use crate::commands::errors::{UserError, format_cli_error};

/// How reports and rows are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Invalid output format '{}'. Valid options: json, yaml",
                s
            )),
        }
    }
}

/// Exits the program with an error message
pub fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exits the program with an error message and usage information
pub fn exit_with_usage_error(message: &str, usage: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", usage);
    process::exit(1);
}

/// Exits with the user-facing message and hint extracted from `err`
pub fn exit_with_handled<E>(err: &E) -> !
where
    E: Handle<UserError> + std::fmt::Display,
{
    eprintln!("{}", format_cli_error(err));
    process::exit(1);
}

/// Renders a value in the requested format
pub fn format_value<T>(value: &T, format: OutputFormat) -> Result<String, String>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yml::to_string(value).map_err(|e| e.to_string()),
    }
}

/// Prints a value in the requested format or exits with error
pub fn print_formatted_or_exit<T>(value: &T, format: OutputFormat, context: &str)
where
    T: serde::Serialize,
{
    match format_value(value, format) {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => exit_with_error(&format!("Failed to format {} as {}: {}", context, format, e)),
    }
}
