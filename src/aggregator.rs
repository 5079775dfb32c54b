// 📊 Trip Aggregator - status tallies, committee counts, date span
//
// Works on trip records alone; never touches leader identities.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::parser::{TripRecord, TripStatus};

/// Trips per committee, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitteeCounts {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl CommitteeCounts {
    pub fn increment(&mut self, committee: &str) {
        match self.index.get(committee).copied() {
            Some(pos) => self.order[pos].1 += 1,
            None => {
                self.index.insert(committee.to_string(), self.order.len());
                self.order.push((committee.to_string(), 1));
            }
        }
    }

    pub fn get(&self, committee: &str) -> usize {
        self.index
            .get(committee)
            .map(|&pos| self.order[pos].1)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for CommitteeCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (name, count) in &self.order {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Per-status trip counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: usize,
    pub full: usize,
    pub waitlisted: usize,
    pub cancelled: usize,
    /// Codes outside O/F/W/C
    pub other: usize,
}

impl StatusCounts {
    /// Trips in one of the four recognized statuses
    pub fn recognized(&self) -> usize {
        self.open + self.full + self.waitlisted + self.cancelled
    }
}

/// Running statistics over the trip listing
#[derive(Debug, Clone)]
pub struct TripAggregator {
    total: usize,
    statuses: StatusCounts,
    committees: CommitteeCounts,
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl TripAggregator {
    pub fn new() -> Self {
        TripAggregator {
            total: 0,
            statuses: StatusCounts::default(),
            committees: CommitteeCounts::default(),
            // Sentinels: the first trip always moves both
            earliest: NaiveDate::MAX,
            latest: NaiveDate::MIN,
        }
    }

    /// Aggregate a whole listing in one pass
    pub fn from_trips(trips: &[TripRecord]) -> Self {
        let mut aggregator = TripAggregator::new();
        for trip in trips {
            aggregator.observe(trip);
        }
        aggregator
    }

    pub fn observe(&mut self, trip: &TripRecord) {
        self.total += 1;
        self.committees.increment(&trip.committee);

        if trip.start_date < self.earliest {
            self.earliest = trip.start_date;
        }
        if trip.start_date > self.latest {
            self.latest = trip.start_date;
        }

        match trip.status {
            TripStatus::Open => self.statuses.open += 1,
            TripStatus::Full => self.statuses.full += 1,
            TripStatus::Waitlisted => self.statuses.waitlisted += 1,
            TripStatus::Cancelled => self.statuses.cancelled += 1,
            TripStatus::Other(_) => self.statuses.other += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn statuses(&self) -> StatusCounts {
        self.statuses
    }

    pub fn committees(&self) -> &CommitteeCounts {
        &self.committees
    }

    /// Inclusive [earliest, latest] start dates, None before any trip
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        (self.total > 0).then_some((self.earliest, self.latest))
    }

    pub fn summary(&self) -> TripStatistics {
        TripStatistics {
            total: self.total,
            statuses: self.statuses,
            earliest: self.date_range().map(|(e, _)| e),
            latest: self.date_range().map(|(_, l)| l),
            committees: self.committees.clone(),
        }
    }
}

impl Default for TripAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the aggregator for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripStatistics {
    pub total: usize,
    pub statuses: StatusCounts,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    pub committees: CommitteeCounts,
}

// ============================================================================
// TESTS
// ============================================================================
