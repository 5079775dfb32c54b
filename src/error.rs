// ⚠️ Error Types - fatal failures vs. recoverable load/credit issues
//
// Fatal: anything that stops the run before output is written.
// Recoverable: skipped rows, suppressed duplicate credits, name collisions.
// Those are recorded as values and carried into the run report.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Fatal errors that abort a run
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A required input file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A required column is absent from a file's header row
    #[error("Column '{column}' missing from header of {}", .file.display())]
    MissingColumn { file: PathBuf, column: String },

    /// CSV read/write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Name resolution was asked to resolve a blank name
    #[error("Cannot resolve an empty name")]
    EmptyName,
}

// ============================================================================
// RECOVERABLE ISSUES
// ============================================================================

/// Which input a skipped row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputKind {
    Leaders,
    Trips,
}

/// A data row that was dropped during load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub input: InputKind,
    /// 1-indexed line in the source file (header is line 1)
    pub line: u64,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    /// Field count differs from the header's
    FieldCount { expected: usize, found: usize },
    /// Person identifier is not a non-negative integer
    InvalidId(String),
    /// Trip start date does not match the configured format
    InvalidDate(String),
    /// A field is not valid UTF-8 (0-based field index)
    Encoding { field: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FieldCount { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
            SkipReason::InvalidId(id) => write!(f, "invalid person identifier '{}'", id),
            SkipReason::InvalidDate(date) => write!(f, "invalid trip start date '{}'", date),
            SkipReason::Encoding { field } => write!(f, "field {} is not valid UTF-8", field + 1),
        }
    }
}

/// Role under which a credit was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditRole {
    Lead,
    CoLead,
}

impl CreditRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRole::Lead => "lead",
            CreditRole::CoLead => "colead",
        }
    }
}

/// A credit suppressed because the leader was already credited on that date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCredit {
    pub leader_id: i64,
    pub name: String,
    pub role: CreditRole,
    pub date: NaiveDate,
}

/// A registry name-key claimed by two different leader IDs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCollision {
    pub key: String,
    /// Leader that keeps the key
    pub owner_id: i64,
    /// Leader that was refused the key
    pub rejected_id: i64,
}
