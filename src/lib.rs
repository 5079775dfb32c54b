// Trip Leader Ledger - Core Library
// Reconciles trip listings against the leader registry and credits leaders

pub mod error;
pub mod config;
pub mod names;          // Name-keys: normalize + split
pub mod entities;       // Leader entity + registry
pub mod parser;         // Leader and trip listing parsers
pub mod resolver;       // Trip name → Leader, synthesizing unknowns
pub mod ledger;         // Lead / co-lead / cancel credit
pub mod aggregator;     // Status, committee and date statistics
pub mod report;         // Summary tables + run report
pub mod pipeline;       // One run, phase by phase

// Re-export commonly used types
pub use error::{
    LedgerError, Result,
    SkippedRow, SkipReason, InputKind,
    DuplicateCredit, CreditRole, NameCollision,
};
pub use config::{Config, LeaderColumns, TripColumns, OutputConfig};
pub use names::{normalize, split_key, compose_key, PersonName};
pub use entities::{Leader, LeaderRegistry};
pub use parser::{
    ListingParser, LeaderListingParser, TripListingParser,
    LeaderRow, TripRecord, TripStatus, ParsedListing,
    load_leaders, load_trips,
};
pub use resolver::{IdentityResolver, Resolution};
pub use ledger::{CreditLedger, CreditOutcome};
pub use aggregator::{TripAggregator, TripStatistics, StatusCounts, CommitteeCounts};
pub use report::{
    LeaderSummaryRow, RunReport, OutputPaths,
    write_leader_summary, write_committee_summary, format_trip_dates,
};
pub use pipeline::{RunContext, credit_trip, run};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
