//! # identity-register: Idempotent Registration of Identity-Service Objects
//!
//! This crate converges tenants, catalog services and endpoints, roles, users,
//! role grants, and EC2 credentials on an OpenStack-style identity service
//! toward a declared state. The only way it talks to the service is by running
//! the `keystone` administration tool and reading the tables it prints.
//!
//! For every declared object the crate:
//!
//! - **Looks it up** by its natural key in a fresh listing
//! - **Decides** whether it is missing, current, or drifted
//! - **Converges** it with create, delete-then-create, or update commands
//! - **Reports** whether anything was changed
//!
//! Running the same declarations twice against an unchanged service issues
//! state-changing commands the first time only.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Facade (Register, manifests, reports)   │
//! ├─────────────────────────────────────────┤
//! │ Reconcilers (one per object kind)       │
//! ├─────────────────────────────────────────┤
//! │ Identity (lookups, id resolution)       │
//! ├─────────────────────────────────────────┤
//! │ Invoker + table parser                  │
//! ├─────────────────────────────────────────┤
//! │ Command executor (child processes)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Parsing Tool Output
//!
//! ```rust
//! # use identity_register::{parse_table, resolve_id};
//! let raw = "\
//! +----------------------------------+---------+---------+
//! |                id                |   name  | enabled |
//! +----------------------------------+---------+---------+
//! | 5c4e1f0b2d8a4b7e9f3a6c1d8e2b4a70 | service |   True  |
//! +----------------------------------+---------+---------+
//! ";
//! let rows = parse_table(raw).unwrap();
//! assert_eq!(rows[0].get("name"), Some("service"));
//!
//! let narrowed = rows.select(&["id", "name"]);
//! assert_eq!(
//!     resolve_id(&narrowed, "id", &[("name", "service")]),
//!     Some("5c4e1f0b2d8a4b7e9f3a6c1d8e2b4a70".to_string())
//! );
//! ```
//!
//! ### Registering Objects
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use identity_register::{ProcessExecutor, Register, RegisterConfig, RoleSpec, TenantSpec};
//! let config = RegisterConfig::default().with_environment();
//! let mut register = Register::from_config(Arc::new(ProcessExecutor), &config);
//!
//! register.ensure_tenant(&TenantSpec::new("service")).unwrap();
//! register.ensure_role(&RoleSpec::new("admin")).unwrap();
//! if register.updated() {
//!     println!("identity service changed");
//! }
//! ```

#![deny(missing_docs)]
mod config;
mod descriptor;
mod errors;
mod executor;
mod identity;
mod invoker;
mod manifest;
mod register;
mod resolver;
mod table;

/// Per-kind reconcilers and the outcomes they report.
///
/// Most callers go through [`Register`]; the reconcilers are exposed for
/// callers that need to drive a single kind with their own [`Identity`].
pub mod reconcile;

// CLI utility modules

/// Command-line interface utilities for program termination and output formatting.
///
/// This module provides common CLI utilities for the identity-register binary,
/// including error reporting, formatted output, and program termination functions.
pub mod cli_utils;

/// Command-line interface command handlers.
///
/// This module contains organized command handlers for the identity-register CLI
/// application, with each command group implemented in a dedicated submodule.
pub mod commands;

pub use config::{CatalogBackend, RegisterConfig};
pub use descriptor::{
    Declaration, Ec2CredentialSpec, EndpointSpec, RoleGrantSpec, RoleSpec, ServiceSpec,
    TenantSpec, UserSpec,
};
pub use errors::{LoadError, RegisterError};
pub use executor::{CommandExecutor, Environment, ExecOutput, ProcessExecutor};
pub use identity::{Found, Identity, Lookup};
pub use invoker::{
    CommandError, CommandInvoker, Credentials, OptionValue, Options, SERVICE_ENDPOINT_VAR,
    SERVICE_TOKEN_VAR, Subject,
};
pub use manifest::Manifest;
pub use reconcile::{Ec2KeyPair, Outcome, Reconcile};
pub use register::{ApplyFailure, MutationFlag, Register, Report, ReportEntry};
pub use resolver::resolve_id;
pub use table::{ParseError, PrettyTable, Row, RowSet, TableParser, parse_table};
