//! # Tabular Output Parsing
//!
//! The keystone tool prints every listing and show command as a pretty-printed
//! table:
//!
//! ```text
//! +----------------------------------+---------+---------+
//! |                id                |   name  | enabled |
//! +----------------------------------+---------+---------+
//! | 1234567890abcdef1234567890abcdef | tenant1 |   True  |
//! +----------------------------------+---------+---------+
//! ```
//!
//! The first line that is not a border names the columns. Every following line
//! is a row of `|`-delimited cells. Cells are trimmed and border lines made of
//! `-` and `+` are skipped.
//!
//! Show and create commands print a vertical `Property | Value` table instead;
//! those are pivoted into a single row so callers can treat both shapes alike.
//!
//! ```rust
//! use identity_register::parse_table;
//!
//! let rows = parse_table("| id | name |\n| abc | role1 |\n").unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].get("name"), Some("role1"));
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static BORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]+$").expect("border pattern is valid"));

/// Errors produced when tool output does not have the expected table shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A data row has a different number of cells than the header has columns.
    ColumnMismatch {
        /// One-based line number of the offending row within the raw output.
        line: usize,
        /// Number of columns named by the header.
        expected: usize,
        /// Number of cells found on the row.
        found: usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::ColumnMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "table row on line {} has {} cells but the header has {} columns",
                line, found, expected
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// One line of tabular output, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell under `column`, if the row has that column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Sets the cell under `column`, replacing any previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Returns true if the row has a cell under `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Iterates over the column names of this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The rows printed by one invocation of a listing command, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RowSet(Vec<Row>);

impl RowSet {
    /// Creates a row set from rows in output order.
    pub fn new(rows: Vec<Row>) -> Self {
        Self(rows)
    }

    /// Narrows every row to the given columns.
    ///
    /// Columns a row does not have stay absent; they are not filled in.
    pub fn select(&self, columns: &[&str]) -> RowSet {
        RowSet(
            self.0
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .filter_map(|column| row.get(column).map(|value| (*column, value)))
                        .collect()
                })
                .collect(),
        )
    }

    /// Returns the first row whose `column` equals `value`.
    pub fn find(&self, column: &str, value: &str) -> Option<&Row> {
        self.0.iter().find(|row| row.get(column) == Some(value))
    }
}

impl std::ops::Deref for RowSet {
    type Target = [Row];

    fn deref(&self) -> &[Row] {
        &self.0
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Turns the raw text a tool printed into rows.
///
/// Reconcilers take a parser at construction so tests can hand them fixed rows.
pub trait TableParser: Send + Sync {
    /// Parses `raw` into rows.
    fn parse(&self, raw: &str) -> Result<RowSet, ParseError>;
}

/// The parser for the tool's pretty-printed tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyTable;

impl TableParser for PrettyTable {
    fn parse(&self, raw: &str) -> Result<RowSet, ParseError> {
        parse_table(raw)
    }
}

/// Parses pretty-printed tabular output into rows.
///
/// Returns zero rows for empty or header-only input and fails when a data row
/// does not have one cell per header column.
pub fn parse_table(raw: &str) -> Result<RowSet, ParseError> {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || BORDER.is_match(line) {
            continue;
        }

        let cells = split_cells(line);
        match &header {
            None => header = Some(cells),
            Some(columns) => {
                if cells.len() != columns.len() {
                    return Err(ParseError::ColumnMismatch {
                        line: index + 1,
                        expected: columns.len(),
                        found: cells.len(),
                    });
                }
                rows.push(columns.iter().cloned().zip(cells).collect::<Row>());
            }
        }
    }

    match header {
        Some(columns) if is_property_table(&columns) => Ok(pivot(rows)),
        _ => Ok(RowSet(rows)),
    }
}

fn split_cells(line: &str) -> Vec<String> {
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn is_property_table(columns: &[String]) -> bool {
    columns.len() == 2 && columns[0] == "Property" && columns[1] == "Value"
}

fn pivot(rows: Vec<Row>) -> RowSet {
    if rows.is_empty() {
        return RowSet::default();
    }
    let row = rows
        .iter()
        .filter_map(|row| Some((row.get("Property")?, row.get("Value")?)))
        .collect::<Row>();
    RowSet(vec![row])
}
