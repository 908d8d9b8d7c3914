//! # Identity Service Access
//!
//! [`Identity`] pairs a [`CommandInvoker`] with a [`TableParser`] and offers the
//! two things every reconciler needs: running a sub-command, and looking an
//! object up in a listing by its natural key.
//!
//! A lookup runs `<kind>-list`, narrows the rows to the id column and the key
//! column, and resolves the id the way [`resolve_id`](crate::resolve_id) does.
//! The full row the id came from is returned too, so update checks compare
//! against the listing fetched in the same call rather than a second one.
//!
//! State-changing commands go through [`Identity::change`], which remembers
//! that one succeeded until [`Identity::take_changed`] is called. A reconciler
//! that fails halfway through a replace has still changed the service.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::resolver::matched_id;
use crate::{CommandError, CommandInvoker, Options, RegisterError, Row, RowSet, Subject, TableParser};

/// A listing query for one object by its natural key.
#[derive(Debug, Clone)]
pub struct Lookup<'a> {
    kind: &'static str,
    key: &'static str,
    value: &'a str,
    args: Options,
    id_column: &'static str,
}

impl<'a> Lookup<'a> {
    /// Looks up the `kind` object whose `key` column equals `value`.
    pub fn new(kind: &'static str, key: &'static str, value: &'a str) -> Self {
        Self {
            kind,
            key,
            value,
            args: Options::new(),
            id_column: "id",
        }
    }

    /// Options passed to the listing command.
    pub fn args(mut self, args: Options) -> Self {
        self.args = args;
        self
    }

    /// Column holding the identifier, `id` unless set.
    pub fn id_column(mut self, id_column: &'static str) -> Self {
        self.id_column = id_column;
        self
    }
}

/// An object found by a [`Lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    /// The object's identifier.
    pub id: String,
    /// The object's full row in the listing.
    pub row: Row,
}

/// Runs commands against the identity service and reads their output.
pub struct Identity {
    invoker: CommandInvoker,
    parser: Arc<dyn TableParser>,
    changed: AtomicBool,
}

impl Identity {
    /// Creates an identity client from its two collaborators.
    pub fn new(invoker: CommandInvoker, parser: Arc<dyn TableParser>) -> Self {
        Self {
            invoker,
            parser,
            changed: AtomicBool::new(false),
        }
    }

    /// The invoker commands go through.
    pub fn invoker(&self) -> &CommandInvoker {
        &self.invoker
    }

    /// Runs `verb` under the service token.
    pub fn run(&self, verb: &str, options: &Options) -> Result<String, CommandError> {
        self.invoker.invoke(verb, options, &Subject::Service)
    }

    /// Runs `verb` under `subject`.
    pub fn run_as(
        &self,
        verb: &str,
        options: &Options,
        subject: &Subject,
    ) -> Result<String, CommandError> {
        self.invoker.invoke(verb, options, subject)
    }

    /// Runs the state-changing `verb` under the service token.
    pub fn change(&self, verb: &str, options: &Options) -> Result<String, CommandError> {
        self.change_as(verb, options, &Subject::Service)
    }

    /// Runs the state-changing `verb` under `subject`.
    pub fn change_as(
        &self,
        verb: &str,
        options: &Options,
        subject: &Subject,
    ) -> Result<String, CommandError> {
        let stdout = self.invoker.invoke(verb, options, subject)?;
        self.changed.store(true, Ordering::Relaxed);
        Ok(stdout)
    }

    /// Returns true if a state-changing command succeeded since the last call.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::Relaxed)
    }

    /// Parses tool output with this client's parser.
    pub fn parse(&self, raw: &str) -> Result<RowSet, RegisterError> {
        Ok(self.parser.parse(raw)?)
    }

    /// Runs `<kind>-list` and parses its rows.
    pub fn list(&self, kind: &str, args: &Options) -> Result<RowSet, RegisterError> {
        let stdout = self.run(&format!("{}-list", kind), args)?;
        self.parse(&stdout)
    }

    /// Finds an object by its natural key.
    pub fn find(&self, lookup: &Lookup<'_>) -> Result<Option<Found>, RegisterError> {
        let rows = self.list(lookup.kind, &lookup.args)?;
        let narrowed = rows.select(&[lookup.id_column, lookup.key]);
        let filters = [(lookup.key, lookup.value)];
        Ok(rows
            .iter()
            .zip(narrowed.iter())
            .find_map(|(row, narrow)| {
                matched_id(narrow, lookup.id_column, &filters).map(|id| Found {
                    id: id.to_string(),
                    row: row.clone(),
                })
            }))
    }

    /// Finds an object's identifier by its natural key.
    pub fn find_id(&self, lookup: &Lookup<'_>) -> Result<Option<String>, RegisterError> {
        Ok(self.find(lookup)?.map(|found| found.id))
    }

    /// Finds an object this one depends on, failing if it does not exist.
    pub fn require_id(&self, lookup: &Lookup<'_>) -> Result<String, RegisterError> {
        self.find_id(lookup)?.ok_or_else(|| RegisterError::Unresolved {
            kind: lookup.kind,
            key: lookup.key,
            value: lookup.value.to_string(),
        })
    }
}
