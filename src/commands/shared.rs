//! # Shared Command Utilities
//!
//! Argument checks and loaders used by more than one command handler.

use crate::{Manifest, cli_utils};

/// Validates both minimum and maximum argument counts.
///
/// # Arguments
/// * `args` - The command arguments array
/// * `min_count` - The minimum number of arguments required (including the command)
/// * `max_count` - The maximum number of arguments allowed (including the command)
/// * `command` - The command name for error message
/// * `usage` - The usage string to display
pub fn validate_args_count_or_exit(
    args: &[String],
    min_count: usize,
    max_count: usize,
    command: &str,
    usage: &str,
) {
    if args.len() < min_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command requires more arguments", command),
            usage,
        );
    }
    if args.len() > max_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command has too many arguments", command),
            usage,
        );
    }
}

/// Loads every manifest named in `paths`, exiting on the first one that fails.
pub fn load_manifests_or_exit(paths: &[String]) -> Vec<(String, Manifest)> {
    paths
        .iter()
        .map(|path| match Manifest::load(path) {
            Ok(manifest) => (path.clone(), manifest),
            Err(e) => cli_utils::exit_with_handled(&e),
        })
        .collect()
}
