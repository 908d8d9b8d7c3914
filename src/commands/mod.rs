//! # Command Handlers
//!
//! Command handlers for the identity-register CLI application, one submodule
//! per command group.
//!
//! ## Structure
//!
//! - `apply` - Manifest commands (apply, validate)
//! - `table` - Tool output inspection (parse-table)
//! - `errors` - User-facing messages and hints for the crate's errors
//! - `shared` - Shared utilities and validation functions

pub mod apply;
pub mod errors;
pub mod shared;
pub mod table;

pub use apply::{handle_apply_command, handle_validate_command};
pub use table::handle_parse_table_command;
