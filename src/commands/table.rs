//! # Parse-Table Command Handler
//!
//! Parses saved tool output and prints the rows it contains, to check what a
//! lookup will see.

use std::io::Read;
use std::path::Path;

use crate::{
    cli_utils, cli_utils::OutputFormat, commands::shared::validate_args_count_or_exit,
    config::read_file, parse_table,
};

const PARSE_TABLE_USAGE: &str = "Usage: identity-register parse-table [file]
Reads standard input when no file is given.";

/// Handles the parse-table command.
///
/// # Arguments
/// * `args` - Command arguments ("parse-table" plus an optional file path)
/// * `output_format` - Output format for the rows
pub fn handle_parse_table_command(args: &[String], output_format: OutputFormat) {
    validate_args_count_or_exit(args, 1, 2, "parse-table", PARSE_TABLE_USAGE);

    let raw = match args.get(1) {
        Some(path) => {
            read_file(Path::new(path)).unwrap_or_else(|e| cli_utils::exit_with_handled(&e))
        }
        None => {
            let mut raw = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
                cli_utils::exit_with_error(&format!("Failed to read standard input: {}", e));
            }
            raw
        }
    };

    let rows = parse_table(&raw).unwrap_or_else(|e| cli_utils::exit_with_handled(&e));
    cli_utils::print_formatted_or_exit(&rows, output_format, "rows");
}
