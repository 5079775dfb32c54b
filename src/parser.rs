// 🏗️ Listing Parsers - leader registry + trip listing
//
// Both inputs are CSV with a header row. Rows are turned into typed records
// once, here; a row whose field count differs from the header is skipped
// and recorded, never fatal.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{LeaderColumns, TripColumns};
use crate::error::{InputKind, LedgerError, Result, SkipReason, SkippedRow};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One row of the leader listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderRow {
    pub line: u64,
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: String,
    pub re_first_name: String,
    pub re_last_name: String,
    pub re_middle_initial: String,
    pub committee: String,
}

/// Trip status code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    Open,
    Full,
    Waitlisted,
    Cancelled,
    /// Any other code; still processed for credit
    Other(String),
}

impl TripStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "O" => TripStatus::Open,
            "F" => TripStatus::Full,
            "W" => TripStatus::Waitlisted,
            "C" => TripStatus::Cancelled,
            other => TripStatus::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            TripStatus::Open => "O",
            TripStatus::Full => "F",
            TripStatus::Waitlisted => "W",
            TripStatus::Cancelled => "C",
            TripStatus::Other(code) => code,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TripStatus::Cancelled)
    }
}

/// One row of the trip listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub line: u64,
    pub committee: String,
    pub start_date: NaiveDate,
    pub status: TripStatus,
    /// Non-empty leader slots, in column order
    pub leaders: Vec<String>,
    /// Non-empty co-leader slots, in column order
    pub co_leaders: Vec<String>,
}

/// Records from one file plus the rows that were dropped
#[derive(Debug, Clone)]
pub struct ParsedListing<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// ListingParser - turns one header-led CSV file into typed records
///
/// Implementors resolve their columns from the header once, then convert
/// each arity-checked row. Returning `Err(reason)` from `parse_row` skips
/// the row.
pub trait ListingParser {
    type Record;
    type Columns;

    /// Which input this parser reads (for diagnostics)
    fn kind(&self) -> InputKind;

    /// Map required column names to header positions
    fn resolve_columns(&self, headers: &HeaderIndex) -> Result<Self::Columns>;

    /// Convert one row; the row already has the header's field count
    fn parse_row(
        &self,
        columns: &Self::Columns,
        record: &StringRecord,
        line: u64,
    ) -> std::result::Result<Self::Record, SkipReason>;

    /// Parse a whole file
    fn parse(&self, path: &Path) -> Result<ParsedListing<Self::Record>> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LedgerError::MissingInput(path.to_path_buf()),
            _ => LedgerError::Io(e),
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = HeaderIndex::new(path, reader.headers()?.clone());
        let columns = self.resolve_columns(&headers)?;

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (row_num, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    // The reader has already consumed the bad record
                    if let csv::ErrorKind::Utf8 { pos, err: utf8 } = err.kind() {
                        let line = pos.as_ref().map(|p| p.line()).unwrap_or(row_num as u64 + 2);
                        let reason = SkipReason::Encoding { field: utf8.field() };
                        warn!("Skipping line {} of {}: {}", line, path.display(), reason);
                        skipped.push(SkippedRow {
                            input: self.kind(),
                            line,
                            reason,
                        });
                        continue;
                    }
                    return Err(err.into());
                }
            };
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(row_num as u64 + 2); // 1-indexed + header row

            let parsed = if record.len() != headers.width() {
                Err(SkipReason::FieldCount {
                    expected: headers.width(),
                    found: record.len(),
                })
            } else {
                self.parse_row(&columns, &record, line)
            };

            match parsed {
                Ok(row) => records.push(row),
                Err(reason) => {
                    warn!("Skipping line {} of {}: {}", line, path.display(), reason);
                    skipped.push(SkippedRow {
                        input: self.kind(),
                        line,
                        reason,
                    });
                }
            }
        }

        info!(
            "Parsed {} rows from {} ({} skipped)",
            records.len(),
            path.display(),
            skipped.len()
        );

        Ok(ParsedListing { records, skipped })
    }
}

/// Header row with column lookup by name
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    path: PathBuf,
    headers: StringRecord,
}

impl HeaderIndex {
    pub fn new(path: &Path, headers: StringRecord) -> Self {
        HeaderIndex {
            path: path.to_path_buf(),
            headers,
        }
    }

    /// Number of header fields; every data row must match it
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Position of a required column
    pub fn require(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LedgerError::MissingColumn {
                file: self.path.clone(),
                column: column.to_string(),
            })
    }
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").to_string()
}

// ============================================================================
// LEADER LISTING
// ============================================================================

/// Leader listing parser
pub struct LeaderListingParser {
    columns: LeaderColumns,
}

/// Header positions of the leader listing columns
pub struct LeaderPositions {
    id: usize,
    email: usize,
    first_name: usize,
    last_name: usize,
    middle_initial: usize,
    re_first_name: usize,
    re_last_name: usize,
    re_middle_initial: usize,
    committee: usize,
}

impl LeaderListingParser {
    pub fn new(columns: LeaderColumns) -> Self {
        LeaderListingParser { columns }
    }
}

impl ListingParser for LeaderListingParser {
    type Record = LeaderRow;
    type Columns = LeaderPositions;

    fn kind(&self) -> InputKind {
        InputKind::Leaders
    }

    fn resolve_columns(&self, headers: &HeaderIndex) -> Result<LeaderPositions> {
        let c = &self.columns;
        Ok(LeaderPositions {
            id: headers.require(&c.id)?,
            email: headers.require(&c.email)?,
            first_name: headers.require(&c.first_name)?,
            last_name: headers.require(&c.last_name)?,
            middle_initial: headers.require(&c.middle_initial)?,
            re_first_name: headers.require(&c.re_first_name)?,
            re_last_name: headers.require(&c.re_last_name)?,
            re_middle_initial: headers.require(&c.re_middle_initial)?,
            committee: headers.require(&c.committee)?,
        })
    }

    fn parse_row(
        &self,
        columns: &LeaderPositions,
        record: &StringRecord,
        line: u64,
    ) -> std::result::Result<LeaderRow, SkipReason> {
        let raw_id = field(record, columns.id);
        // Negative IDs are reserved for synthetic identities
        let id = raw_id
            .parse::<i64>()
            .ok()
            .filter(|id| *id >= 0)
            .ok_or_else(|| SkipReason::InvalidId(raw_id.clone()))?;

        Ok(LeaderRow {
            line,
            id,
            email: field(record, columns.email),
            first_name: field(record, columns.first_name),
            last_name: field(record, columns.last_name),
            middle_initial: field(record, columns.middle_initial),
            re_first_name: field(record, columns.re_first_name),
            re_last_name: field(record, columns.re_last_name),
            re_middle_initial: field(record, columns.re_middle_initial),
            committee: field(record, columns.committee),
        })
    }
}

// ============================================================================
// TRIP LISTING
// ============================================================================

/// Trip listing parser
pub struct TripListingParser {
    columns: TripColumns,
}

/// Header positions of the trip listing columns
pub struct TripPositions {
    committee: usize,
    start_date: usize,
    status: usize,
    leaders: Vec<usize>,
    co_leaders: Vec<usize>,
}

impl TripListingParser {
    pub fn new(columns: TripColumns) -> Self {
        TripListingParser { columns }
    }
}

impl ListingParser for TripListingParser {
    type Record = TripRecord;
    type Columns = TripPositions;

    fn kind(&self) -> InputKind {
        InputKind::Trips
    }

    fn resolve_columns(&self, headers: &HeaderIndex) -> Result<TripPositions> {
        let c = &self.columns;
        Ok(TripPositions {
            committee: headers.require(&c.committee)?,
            start_date: headers.require(&c.start_date)?,
            status: headers.require(&c.status)?,
            leaders: c
                .leaders
                .iter()
                .map(|name| headers.require(name))
                .collect::<Result<_>>()?,
            co_leaders: c
                .co_leaders
                .iter()
                .map(|name| headers.require(name))
                .collect::<Result<_>>()?,
        })
    }

    fn parse_row(
        &self,
        columns: &TripPositions,
        record: &StringRecord,
        line: u64,
    ) -> std::result::Result<TripRecord, SkipReason> {
        let raw_date = field(record, columns.start_date);
        let start_date = NaiveDate::parse_from_str(&raw_date, &self.columns.date_format)
            .map_err(|_| SkipReason::InvalidDate(raw_date.clone()))?;

        let names = |slots: &[usize]| -> Vec<String> {
            slots
                .iter()
                .map(|&idx| field(record, idx))
                .filter(|name| !name.is_empty())
                .collect()
        };

        Ok(TripRecord {
            line,
            committee: field(record, columns.committee),
            start_date,
            status: TripStatus::from_code(&field(record, columns.status)),
            leaders: names(&columns.leaders[..]),
            co_leaders: names(&columns.co_leaders[..]),
        })
    }
}

/// Load the leader listing with the given column names
pub fn load_leaders(path: &Path, columns: &LeaderColumns) -> Result<ParsedListing<LeaderRow>> {
    LeaderListingParser::new(columns.clone()).parse(path)
}

/// Load the trip listing with the given column names
pub fn load_trips(path: &Path, columns: &TripColumns) -> Result<ParsedListing<TripRecord>> {
    TripListingParser::new(columns.clone()).parse(path)
}

// ============================================================================
// TESTS
// ============================================================================
