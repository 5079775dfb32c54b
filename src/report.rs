// 📤 Reports - leader summary, committee summary, run report
//
// Leader summary columns:
//   ID, PrimaryName, FirstName, LastName, Known, Email, Active,
//   Leads, CoLeads, Cancels, TripDates

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::aggregator::{CommitteeCounts, TripStatistics};
use crate::entities::{Leader, LeaderRegistry};
use crate::error::{DuplicateCredit, NameCollision, Result, SkippedRow};

/// Header of the leader summary table
pub const LEADER_FIELDS: [&str; 11] = [
    "ID",
    "PrimaryName",
    "FirstName",
    "LastName",
    "Known",
    "Email",
    "Active",
    "Leads",
    "CoLeads",
    "Cancels",
    "TripDates",
];

// ============================================================================
// LEADER SUMMARY
// ============================================================================

/// One row of the leader summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderSummaryRow {
    pub id: i64,
    pub primary_name: String,
    pub first_name: String,
    pub last_name: String,
    pub known: u8,
    pub email: String,
    pub active: u32,
    pub leads: u32,
    pub co_leads: u32,
    pub cancels: u32,
    pub trip_dates: String,
}

impl From<&Leader> for LeaderSummaryRow {
    fn from(leader: &Leader) -> Self {
        LeaderSummaryRow {
            id: leader.id,
            primary_name: leader.primary_name().to_string(),
            first_name: leader.first_name(),
            last_name: leader.last_name(),
            known: u8::from(leader.known),
            email: leader.email.clone(),
            active: leader.activity(),
            leads: leader.trips_as_leader,
            co_leads: leader.trips_as_co_leader,
            cancels: leader.trips_cancelled,
            trip_dates: format_trip_dates(&leader.credited_dates),
        }
    }
}

/// Render credited dates as a quoted set, ascending
///
/// {06/01/2023, 06/08/2023} → "{'06/01/2023', '06/08/2023'}"
/// An empty set renders as an empty string.
pub fn format_trip_dates(dates: &BTreeSet<NaiveDate>) -> String {
    if dates.is_empty() {
        return String::new();
    }

    let inner = dates
        .iter()
        .map(|d| format!("'{}'", d.format("%m/%d/%Y")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("\"{{{}}}\"", inner)
}

/// Write the leader summary for every leader, in registry order
pub fn write_leader_summary<W: Write>(writer: W, registry: &LeaderRegistry) -> Result<()> {
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(LEADER_FIELDS)?;
    for leader in registry.iter() {
        csv.serialize(LeaderSummaryRow::from(leader))?;
    }
    csv.flush()?;
    Ok(())
}

// ============================================================================
// COMMITTEE SUMMARY
// ============================================================================

/// Write one `committee,count` row per committee, no header
pub fn write_committee_summary<W: Write>(writer: W, committees: &CommitteeCounts) -> Result<()> {
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    for (committee, count) in committees.iter() {
        csv.serialize((committee, count))?;
    }
    csv.flush()?;
    Ok(())
}

// ============================================================================
// RUN REPORT
// ============================================================================

/// Where the summary tables were written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPaths {
    pub leaders: PathBuf,
    pub committees: PathBuf,
}

/// Everything a run learned, for humans and for --summary-json
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub trips: TripStatistics,
    pub leaders_known: usize,
    pub leaders_synthetic: usize,
    pub credits_granted: usize,
    pub cancellations: usize,
    pub skipped_rows: Vec<SkippedRow>,
    pub duplicate_credits: Vec<DuplicateCredit>,
    pub name_collisions: Vec<NameCollision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputPaths>,
}

impl RunReport {
    /// Multi-line human summary, same facts as the JSON report
    pub fn summary(&self) -> String {
        let s = &self.trips.statuses;
        let mut lines = vec![format!("statistics on {} trips:", self.trips.total)];

        if let (Some(earliest), Some(latest)) = (self.trips.earliest, self.trips.latest) {
            lines.push(format!(
                "trip data spans {} to {}",
                earliest.format("%m/%d/%Y"),
                latest.format("%m/%d/%Y")
            ));
        }
        lines.push(format!(
            "{} Open, {} Full, {} Waitlisted, {} cancelled",
            s.open, s.full, s.waitlisted, s.cancelled
        ));
        lines.push(format!(
            "{} known leaders, {} unregistered names, {} credits, {} duplicates suppressed",
            self.leaders_known,
            self.leaders_synthetic,
            self.credits_granted,
            self.duplicate_credits.len()
        ));
        if !self.skipped_rows.is_empty() {
            lines.push(format!("{} malformed rows skipped", self.skipped_rows.len()));
        }

        lines.join("\n")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::from)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::StatusCounts;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    #[test]
    fn test_format_trip_dates() {
        let mut dates = BTreeSet::new();
        assert_eq!(format_trip_dates(&dates), "");

        dates.insert(date(6, 8));
        dates.insert(date(6, 1));
        assert_eq!(format_trip_dates(&dates), "\"{'06/01/2023', '06/08/2023'}\"");
    }

    #[test]
    fn test_leader_summary_row() {
        let mut leader = Leader::new(7, "a@x.org");
        leader.names.push("jane_q_public".to_string());
        leader.trips_as_leader = 2;
        leader.trips_as_co_leader = 1;
        leader.trips_cancelled = 4;

        let row = LeaderSummaryRow::from(&leader);

        assert_eq!(row.primary_name, "jane_q_public");
        assert_eq!(row.first_name, "Jane");
        assert_eq!(row.last_name, "Public");
        assert_eq!(row.known, 1);
        assert_eq!(row.active, 3);
        assert_eq!(row.cancels, 4);
    }

    #[test]
    fn test_write_leader_summary() {
        let mut registry = LeaderRegistry::new();
        registry.get_or_create_known(7, "a@x.org");
        registry.add_name(7, "jane_q_public".to_string());
        registry
            .get_mut(7)
            .unwrap()
            .credited_dates
            .insert(date(6, 1));
        registry.get_mut(7).unwrap().trips_as_leader = 1;

        let mut out = Vec::new();
        write_leader_summary(&mut out, &registry).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "ID,PrimaryName,FirstName,LastName,Known,Email,Active,Leads,CoLeads,Cancels,TripDates"
        );
        assert_eq!(
            lines[1],
            "7,jane_q_public,Jane,Public,1,a@x.org,1,1,0,0,\"\"\"{'06/01/2023'}\"\"\""
        );
    }

    #[test]
    fn test_write_leader_summary_empty_registry_has_header() {
        let mut out = Vec::new();
        write_leader_summary(&mut out, &LeaderRegistry::new()).unwrap();

        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_write_committee_summary() {
        let mut committees = CommitteeCounts::default();
        committees.increment("Hiking");
        committees.increment("Paddling");
        committees.increment("Hiking");

        let mut out = Vec::new();
        write_committee_summary(&mut out, &committees).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Hiking,2\nPaddling,1\n");
    }

    #[test]
    fn test_run_report_summary() {
        let report = RunReport {
            trips: TripStatistics {
                total: 3,
                statuses: StatusCounts {
                    open: 1,
                    full: 1,
                    waitlisted: 0,
                    cancelled: 1,
                    other: 0,
                },
                earliest: Some(date(6, 1)),
                latest: Some(date(7, 4)),
                committees: CommitteeCounts::default(),
            },
            leaders_known: 2,
            leaders_synthetic: 1,
            credits_granted: 3,
            cancellations: 1,
            skipped_rows: vec![],
            duplicate_credits: vec![],
            name_collisions: vec![],
            outputs: None,
        };

        let summary = report.summary();
        assert!(summary.contains("statistics on 3 trips:"));
        assert!(summary.contains("trip data spans 06/01/2023 to 07/04/2023"));
        assert!(summary.contains("1 Open, 1 Full, 0 Waitlisted, 1 cancelled"));
        assert!(!summary.contains("malformed"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["leaders_synthetic"], 1);
        assert!(json.get("outputs").is_none());
    }
}
