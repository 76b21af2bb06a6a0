//! Core domain models for raw and cleaned birth records
//!
//! Architecture: Rich Domain Models - Record sets own their column order and know how to merge
//! - A Record is a sparse map from canonical field name to free text
//! - RecordSet acts as an aggregate root holding the ordered column list
//! - ResolvedAddress is the closed outcome of address resolution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Sentinel written when no usable address text was present
pub const MISSING: &str = "MISSING";

/// Sentinel written when address text matched nothing in the taxonomy
pub const TRANSIENT: &str = "TRANSIENT";

/// A single birth record keyed by canonical field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment, mostly useful for fixtures
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field value, replacing any previous one
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Field value, or the empty string when the field is absent
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Whether the record carries the field at all
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Remove a field, returning its previous value
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// An ordered table of records sharing a column list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Column names in display order
    pub columns: Vec<String>,
    /// Rows in input order
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Create an empty record set with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, records: Vec::new() }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the column is part of this set's schema
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Append a record, registering any columns it introduces (sorted, after existing ones)
    pub fn push(&mut self, record: Record) {
        let mut new_columns: Vec<&String> =
            record.fields.keys().filter(|field| !self.has_column(field)).collect();
        new_columns.sort();
        let new_columns: Vec<String> = new_columns.into_iter().cloned().collect();
        self.columns.extend(new_columns);
        self.records.push(record);
    }

    /// Concatenate record sets; columns are the first-seen union of all inputs
    pub fn concat<I: IntoIterator<Item = RecordSet>>(sets: I) -> Self {
        let mut merged = RecordSet::default();
        for set in sets {
            for column in set.columns {
                if !merged.has_column(&column) {
                    merged.columns.push(column);
                }
            }
            merged.records.extend(set.records);
        }
        merged
    }

    /// Drop columns from both the schema and every record
    pub fn drop_columns(&mut self, columns: &[String]) {
        self.columns.retain(|c| !columns.contains(c));
        for record in &mut self.records {
            for column in columns {
                record.remove(column);
            }
        }
    }

    /// Rows as ordered string vectors matching `columns`
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.records
            .iter()
            .map(move |r| self.columns.iter().map(|c| r.get(c)).collect())
    }
}

/// Outcome of resolving a raw address against the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedAddress {
    /// A canonical district name from the taxonomy
    District(String),
    /// No usable address text
    Missing,
    /// Address text present but not in the taxonomy
    Transient,
}

impl ResolvedAddress {
    /// Value written into the cleaned address column
    pub fn as_str(&self) -> &str {
        match self {
            Self::District(name) => name,
            Self::Missing => MISSING,
            Self::Transient => TRANSIENT,
        }
    }

    /// Whether this is one of the sentinel outcomes
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::District(_))
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types that can occur while standardizing records
#[derive(Debug, thiserror::Error)]
pub enum StandardizerError {
    /// Configuration file could not be loaded, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or written
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Matcher compilation failed
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// Input file could not be parsed as a table
    #[error("Could not read {file}: {message}")]
    Ingest { file: String, message: String },

    /// A column required by an operation is absent
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    /// Report could not be written
    #[error("Export error: {message}")]
    Export { message: String },
}

impl StandardizerError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern { message: message.into() }
    }

    /// Create an ingest error for a specific file
    pub fn ingest(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingest { file: file.into(), message: message.into() }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn { column: column.into() }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export { message: message.into() }
    }
}

/// Result type for standardizer operations
pub type StandardizerResult<T> = Result<T, StandardizerError>;
