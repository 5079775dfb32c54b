// ⚙️ Configuration - column names, date format, output locations
//
// Every field has a default matching the Activities Database export, so a
// config file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, Result};

/// Top-level run configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub leader_columns: LeaderColumns,
    pub trip_columns: TripColumns,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| LedgerError::Config(format!("{} ({})", e, path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LedgerError::Config(e.to_string()))
    }
}

/// Header names in the leader listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderColumns {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: String,
    pub re_first_name: String,
    pub re_last_name: String,
    pub re_middle_initial: String,
    pub committee: String,
}

impl Default for LeaderColumns {
    fn default() -> Self {
        LeaderColumns {
            id: "ConstituentID".to_string(),
            email: "Email".to_string(),
            first_name: "FirstName".to_string(),
            last_name: "LastName".to_string(),
            middle_initial: "MiddleInitial".to_string(),
            re_first_name: "REFirstName".to_string(),
            re_last_name: "RELastName".to_string(),
            re_middle_initial: "REMiddleInitial".to_string(),
            committee: "Committee".to_string(),
        }
    }
}

/// Header names in the trip listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripColumns {
    pub committee: String,
    pub start_date: String,
    pub status: String,
    /// Leader slots, in credit order
    pub leaders: Vec<String>,
    /// Co-leader slots, in credit order
    pub co_leaders: Vec<String>,
    /// chrono format string for the start date
    pub date_format: String,
}

impl Default for TripColumns {
    fn default() -> Self {
        TripColumns {
            committee: "Committee".to_string(),
            start_date: "TripStartDate".to_string(),
            status: "TripStatus".to_string(),
            leaders: (1..=4).map(|n| format!("TripLeader{}", n)).collect(),
            co_leaders: (1..=2).map(|n| format!("TripCoLeader{}", n)).collect(),
            date_format: "%m/%d/%Y".to_string(),
        }
    }
}

/// Where the two summary tables go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Defaults to the trip listing's directory
    pub directory: Option<PathBuf>,
    pub leader_suffix: String,
    pub committee_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: None,
            leader_suffix: "-leaderdata.csv".to_string(),
            committee_suffix: "-committeedata.csv".to_string(),
        }
    }
}

impl OutputConfig {
    /// Leader summary path derived from the trip listing path
    ///
    /// tripdata/trips.csv → tripdata/trips-leaderdata.csv
    pub fn leader_path(&self, trip_path: &Path) -> PathBuf {
        self.derive(trip_path, &self.leader_suffix)
    }

    /// Committee summary path derived from the trip listing path
    pub fn committee_path(&self, trip_path: &Path) -> PathBuf {
        self.derive(trip_path, &self.committee_suffix)
    }

    fn derive(&self, trip_path: &Path, suffix: &str) -> PathBuf {
        let stem = trip_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("trips");
        let dir = match &self.directory {
            Some(dir) => dir.clone(),
            None => trip_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        dir.join(format!("{}{}", stem, suffix))
    }
}
