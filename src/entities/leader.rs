// 🧭 Leader Entity - Stable identity + name variants
//
// "The ID is the IDENTITY, names are VALUES that point at it"
//
// Problem solved:
// - "Jane Q Public", "Jane Public", "JANE Q PUBLIC" → same leader
// - Several registry rows per person merge into one identity
// - Names seen only on trips get a synthetic identity (negative ID)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::error::NameCollision;
use crate::names::{compose_key, PersonName};
use crate::parser::LeaderRow;

// ============================================================================
// LEADER ENTITY
// ============================================================================

/// Leader - one person who may lead or co-lead trips
///
/// Identity: `id` (never changes)
/// Values: names, email, committees, credit counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    /// Registry ID (>= 0) or synthetic ID (< 0)
    pub id: i64,

    /// True iff the identity came from the leader registry
    pub known: bool,

    /// Lower-cased, empty if unknown
    pub email: String,

    /// Distinct name-keys in insertion order; first is primary
    pub names: Vec<String>,

    /// Committees from the registry
    pub committees: BTreeSet<String>,

    /// Dates already credited, across both lead and co-lead roles
    pub credited_dates: BTreeSet<NaiveDate>,

    pub trips_as_leader: u32,
    pub trips_as_co_leader: u32,
    pub trips_cancelled: u32,
}

impl Leader {
    /// Create a registry-known leader
    pub fn new(id: i64, email: &str) -> Self {
        Leader {
            id,
            known: true,
            email: email.trim().to_lowercase(),
            names: Vec::new(),
            committees: BTreeSet::new(),
            credited_dates: BTreeSet::new(),
            trips_as_leader: 0,
            trips_as_co_leader: 0,
            trips_cancelled: 0,
        }
    }

    /// Create a leader known only from trip data
    pub fn synthetic(id: i64) -> Self {
        Leader {
            known: false,
            ..Leader::new(id, "")
        }
    }

    /// First registered name-key, or "" when the leader has none
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    /// Display parts of the primary name
    pub fn person_name(&self) -> PersonName {
        PersonName::from_key(self.primary_name())
    }

    pub fn first_name(&self) -> String {
        self.person_name().first
    }

    /// Last name; the third split part when a middle name is present
    pub fn last_name(&self) -> String {
        self.person_name().last
    }

    /// Trips actually led or co-led. Cancelled trips never count.
    pub fn activity(&self) -> u32 {
        self.trips_as_leader + self.trips_as_co_leader
    }

    pub fn has_name(&self, key: &str) -> bool {
        self.names.iter().any(|n| n == key)
    }
}

impl std::fmt::Display for Leader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Leader({}, {})", self.id, self.primary_name())
    }
}

// ============================================================================
// LEADER REGISTRY
// ============================================================================

/// Registry of every leader in a run
///
/// Leaders live in a Vec in creation order; two indexes point into it:
/// by ID and by name-key. A name-key maps to exactly one leader.
#[derive(Debug, Default)]
pub struct LeaderRegistry {
    leaders: Vec<Leader>,
    by_id: HashMap<i64, usize>,
    by_name: HashMap<String, usize>,
    collisions: Vec<NameCollision>,
}

impl LeaderRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the leader for `id`, creating a known leader if absent
    ///
    /// An existing leader with an empty email picks up `email`.
    pub fn get_or_create_known(&mut self, id: i64, email: &str) -> &mut Leader {
        let idx = match self.by_id.get(&id).copied() {
            Some(idx) => {
                let leader = &mut self.leaders[idx];
                if leader.email.is_empty() && !email.trim().is_empty() {
                    leader.email = email.trim().to_lowercase();
                }
                idx
            }
            None => self.insert(Leader::new(id, email)),
        };
        &mut self.leaders[idx]
    }

    /// Register a brand-new leader with a first name-key
    ///
    /// The caller guarantees neither the ID nor the key is taken.
    /// Returns the new leader's arena slot.
    pub(crate) fn insert_synthetic(&mut self, leader: Leader, key: String) -> usize {
        let idx = self.insert(leader);
        self.index_name(idx, key);
        idx
    }

    /// Arena slot of the leader owning a name-key
    pub(crate) fn slot_by_name(&self, key: &str) -> Option<usize> {
        self.by_name.get(key).copied()
    }

    /// Leader at an arena slot handed out by this registry
    pub(crate) fn slot(&self, slot: usize) -> &Leader {
        &self.leaders[slot]
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Leader {
        &mut self.leaders[slot]
    }

    fn insert(&mut self, leader: Leader) -> usize {
        let idx = self.leaders.len();
        self.by_id.insert(leader.id, idx);
        self.leaders.push(leader);
        idx
    }

    /// Build the registry from parsed leader-listing rows
    pub fn from_rows(rows: &[LeaderRow]) -> Self {
        let mut registry = LeaderRegistry::new();
        for row in rows {
            registry.register_row(row);
        }
        registry
    }

    /// Fold one registry row into its leader
    ///
    /// Rows sharing an ID merge: both name triples and the committee are
    /// added to the same leader.
    pub fn register_row(&mut self, row: &LeaderRow) {
        let leader = self.get_or_create_known(row.id, &row.email);
        if !row.committee.is_empty() {
            leader.committees.insert(row.committee.clone());
        }

        let keys = [
            compose_key(&row.first_name, &row.last_name, &row.middle_initial),
            compose_key(&row.re_first_name, &row.re_last_name, &row.re_middle_initial),
        ];
        for key in keys.into_iter().flatten() {
            self.add_name(row.id, key);
        }
    }

    /// Attach a name-key to leader `id` and index it
    ///
    /// Returns false when the key already belongs to another leader; the
    /// first owner keeps it and the collision is recorded.
    pub fn add_name(&mut self, id: i64, key: String) -> bool {
        let Some(&idx) = self.by_id.get(&id) else {
            return false;
        };

        match self.by_name.get(&key).copied() {
            Some(owner) if owner == idx => true,
            Some(owner) => {
                let owner_id = self.leaders[owner].id;
                warn!(
                    "Name '{}' already belongs to leader {}, not adding it to leader {}",
                    key, owner_id, id
                );
                self.collisions.push(NameCollision {
                    key,
                    owner_id,
                    rejected_id: id,
                });
                false
            }
            None => {
                self.index_name(idx, key);
                true
            }
        }
    }

    fn index_name(&mut self, idx: usize, key: String) {
        let leader = &mut self.leaders[idx];
        if !leader.has_name(&key) {
            leader.names.push(key.clone());
        }
        self.by_name.insert(key, idx);
    }

    pub fn get(&self, id: i64) -> Option<&Leader> {
        self.by_id.get(&id).map(|&idx| &self.leaders[idx])
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut Leader> {
        self.by_id.get(&id).map(|&idx| &mut self.leaders[idx])
    }

    /// Find leader by name-key (already normalized)
    pub fn get_by_name(&self, key: &str) -> Option<&Leader> {
        self.by_name.get(key).map(|&idx| &self.leaders[idx])
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All leaders in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Leader> {
        self.leaders.iter()
    }

    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }

    pub fn known_count(&self) -> usize {
        self.leaders.iter().filter(|l| l.known).count()
    }

    pub fn synthetic_count(&self) -> usize {
        self.leaders.iter().filter(|l| !l.known).count()
    }

    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }
}

// ============================================================================
// TESTS
// ============================================================================
