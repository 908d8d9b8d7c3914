//! # Apply and Validate Command Handlers
//!
//! `apply` reconciles manifests against the identity service and prints a
//! report per manifest. `validate` only loads them and checks required
//! attributes; it never runs the tool.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::{
    ProcessExecutor, Register, RegisterConfig, Report, cli_utils,
    cli_utils::OutputFormat,
    commands::errors::UserError,
    commands::shared::{load_manifests_or_exit, validate_args_count_or_exit},
};

const APPLY_USAGE: &str = "Usage: identity-register apply <manifest.yaml> [manifest.yaml...]";
const VALIDATE_USAGE: &str =
    "Usage: identity-register validate <manifest.yaml> [manifest.yaml...]";

#[derive(Serialize)]
struct ManifestReport<'a> {
    manifest: &'a str,
    #[serde(flatten)]
    report: Report,
}

#[derive(Serialize)]
struct ManifestCheck<'a> {
    manifest: &'a str,
    objects: usize,
}

/// Handles the apply command.
///
/// # Arguments
/// * `args` - Command arguments ("apply" plus manifest paths)
/// * `config` - How to run the administration tool
/// * `output_format` - Output format for the report
pub fn handle_apply_command(args: &[String], config: &RegisterConfig, output_format: OutputFormat) {
    validate_args_count_or_exit(args, 2, usize::MAX, "apply", APPLY_USAGE);

    let manifests = load_manifests_or_exit(&args[1..]);
    let mut register = Register::from_config(Arc::new(ProcessExecutor), config);

    for (path, manifest) in &manifests {
        info!(manifest = %path, objects = manifest.objects.len(), "applying manifest");
        match register.apply_all(manifest) {
            Ok(report) => cli_utils::print_formatted_or_exit(
                &ManifestReport {
                    manifest: path,
                    report,
                },
                output_format,
                "report",
            ),
            Err(failure) => {
                cli_utils::print_formatted_or_exit(
                    &ManifestReport {
                        manifest: path,
                        report: failure.completed.clone(),
                    },
                    output_format,
                    "report",
                );
                cli_utils::exit_with_handled(&failure);
            }
        }
    }
    info!(updated = register.updated(), "all manifests applied");
}

/// Handles the validate command.
///
/// # Arguments
/// * `args` - Command arguments ("validate" plus manifest paths)
/// * `output_format` - Output format for the summary
pub fn handle_validate_command(args: &[String], output_format: OutputFormat) {
    validate_args_count_or_exit(args, 2, usize::MAX, "validate", VALIDATE_USAGE);

    let manifests = load_manifests_or_exit(&args[1..]);
    let mut checks = Vec::new();
    for (path, manifest) in &manifests {
        if let Err((index, err)) = manifest.validate() {
            let declaration = &manifest.objects[index];
            cli_utils::exit_with_handled(&UserError {
                message: format!(
                    "{}: object {} ({} '{}'): {}",
                    path,
                    index + 1,
                    declaration.kind(),
                    declaration.label(),
                    err
                ),
                usage_hint: None,
            });
        }
        checks.push(ManifestCheck {
            manifest: path,
            objects: manifest.objects.len(),
        });
    }
    cli_utils::print_formatted_or_exit(&checks, output_format, "validation summary");
}
