// 🔁 Pipeline - one run, start to finish
//
// Phases run strictly in order:
//   1. load leader registry
//   2. load trip listing
//   3. resolve names + attribute credit (one pass, trip by trip)
//   4. aggregate trip statistics
//   5. write summaries
//
// All state lives in RunContext; nothing is global, so a second run starts
// from scratch with synthetic IDs back at -1.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::aggregator::TripAggregator;
use crate::config::Config;
use crate::entities::LeaderRegistry;
use crate::error::{CreditRole, LedgerError, Result, SkippedRow};
use crate::ledger::{CreditLedger, CreditOutcome};
use crate::parser::{self, TripRecord};
use crate::report::{self, OutputPaths, RunReport};
use crate::resolver::IdentityResolver;

/// State of a single run
#[derive(Debug)]
pub struct RunContext {
    pub config: Config,
    pub registry: LeaderRegistry,
    pub resolver: IdentityResolver,
    pub ledger: CreditLedger,
    pub aggregator: TripAggregator,
    pub trips: Vec<TripRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl RunContext {
    pub fn new(config: Config) -> Self {
        RunContext {
            config,
            registry: LeaderRegistry::new(),
            resolver: IdentityResolver::new(),
            ledger: CreditLedger::new(),
            aggregator: TripAggregator::new(),
            trips: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Phase 1: build the registry from the leader listing
    pub fn load_registry(&mut self, path: &Path) -> Result<()> {
        info!("Loading leader list from {}", path.display());
        let parsed = parser::load_leaders(path, &self.config.leader_columns)?;

        for row in &parsed.records {
            self.registry.register_row(row);
        }
        self.skipped.extend(parsed.skipped);

        info!("Loaded data on {} leaders", self.registry.len());
        Ok(())
    }

    /// Phase 2: read the trip listing
    pub fn load_trips(&mut self, path: &Path) -> Result<()> {
        info!("Analyzing trip listings in {}", path.display());
        let parsed = parser::load_trips(path, &self.config.trip_columns)?;

        self.trips = parsed.records;
        self.skipped.extend(parsed.skipped);
        Ok(())
    }

    /// Phase 3: resolve every leader and co-leader slot and credit it
    pub fn attribute_credits(&mut self) -> Result<()> {
        let RunContext {
            registry,
            resolver,
            ledger,
            trips,
            ..
        } = self;

        for trip in trips.iter() {
            credit_trip(registry, resolver, ledger, trip)?;
        }

        info!(
            "Finished processing all the trips: {} credits, {} duplicates suppressed, {} unregistered names",
            ledger.credited(),
            ledger.duplicates().len(),
            resolver.synthesized()
        );
        Ok(())
    }

    /// Phase 4: status, committee and date statistics
    pub fn aggregate(&mut self) {
        self.aggregator = TripAggregator::from_trips(&self.trips);
    }

    /// Phase 5: write both summary tables
    pub fn write_outputs(&self, trip_path: &Path) -> Result<OutputPaths> {
        let output = &self.config.output;
        if let Some(dir) = &output.directory {
            std::fs::create_dir_all(dir)?;
        }

        let paths = OutputPaths {
            leaders: output.leader_path(trip_path),
            committees: output.committee_path(trip_path),
        };

        info!("Writing leader data to {}", paths.leaders.display());
        let file = BufWriter::new(File::create(&paths.leaders)?);
        report::write_leader_summary(file, &self.registry)?;

        info!("Writing committee data to {}", paths.committees.display());
        let file = BufWriter::new(File::create(&paths.committees)?);
        report::write_committee_summary(file, self.aggregator.committees())?;

        Ok(paths)
    }

    /// Everything learned so far
    pub fn report(&self, outputs: Option<OutputPaths>) -> RunReport {
        RunReport {
            trips: self.aggregator.summary(),
            leaders_known: self.registry.known_count(),
            leaders_synthetic: self.registry.synthetic_count(),
            credits_granted: self.ledger.credited(),
            cancellations: self.ledger.cancelled(),
            skipped_rows: self.skipped.clone(),
            duplicate_credits: self.ledger.duplicates().to_vec(),
            name_collisions: self.registry.collisions().to_vec(),
            outputs,
        }
    }
}

/// Resolve and credit every participant of one trip
///
/// Leader slots go first, then co-leader slots, so a person named in both
/// roles on one date is credited as leader.
pub fn credit_trip(
    registry: &mut LeaderRegistry,
    resolver: &mut IdentityResolver,
    ledger: &mut CreditLedger,
    trip: &TripRecord,
) -> Result<Vec<CreditOutcome>> {
    let slots = trip
        .leaders
        .iter()
        .map(|name| (name, CreditRole::Lead))
        .chain(trip.co_leaders.iter().map(|name| (name, CreditRole::CoLead)));

    let mut outcomes = Vec::new();
    for (name, role) in slots {
        let leader = resolver.resolve(registry, name)?;

        let outcome = if trip.status.is_cancelled() {
            ledger.credit_cancel(leader)
        } else {
            match role {
                CreditRole::Lead => ledger.credit_lead(leader, trip.start_date),
                CreditRole::CoLead => ledger.credit_co_lead(leader, trip.start_date),
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Run phases 1-4 over the two listings
///
/// Fails before any computation if either input is missing.
pub fn run(config: Config, leader_path: &Path, trip_path: &Path) -> Result<RunContext> {
    for path in [leader_path, trip_path] {
        if !path.exists() {
            return Err(LedgerError::MissingInput(path.to_path_buf()));
        }
    }

    let mut ctx = RunContext::new(config);
    ctx.load_registry(leader_path)?;
    ctx.load_trips(trip_path)?;
    ctx.attribute_credits()?;
    ctx.aggregate();
    Ok(ctx)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TripStatus;
    use chrono::NaiveDate;

    fn trip(status: &str, leaders: &[&str], co_leaders: &[&str]) -> TripRecord {
        TripRecord {
            line: 2,
            committee: "Hiking".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            status: TripStatus::from_code(status),
            leaders: leaders.iter().map(|s| s.to_string()).collect(),
            co_leaders: co_leaders.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn jane_registry() -> LeaderRegistry {
        let mut registry = LeaderRegistry::new();
        registry.get_or_create_known(7, "a@x.org");
        registry.add_name(7, "jane_q_public".to_string());
        registry
    }

    #[test]
    fn test_credit_trip_known_leader() {
        let mut registry = jane_registry();
        let mut resolver = IdentityResolver::new();
        let mut ledger = CreditLedger::new();

        let outcomes = credit_trip(
            &mut registry,
            &mut resolver,
            &mut ledger,
            &trip("O", &["Jane Q Public"], &[]),
        )
        .unwrap();

        assert_eq!(outcomes, vec![CreditOutcome::Credited]);
        let jane = registry.get(7).unwrap();
        assert_eq!(jane.trips_as_leader, 1);
        assert_eq!(jane.activity(), 1);
    }

    #[test]
    fn test_credit_trip_same_person_both_roles() {
        let mut registry = jane_registry();
        let mut resolver = IdentityResolver::new();
        let mut ledger = CreditLedger::new();

        let outcomes = credit_trip(
            &mut registry,
            &mut resolver,
            &mut ledger,
            &trip("O", &["Jane Q Public"], &["jane q public"]),
        )
        .unwrap();

        assert_eq!(
            outcomes,
            vec![CreditOutcome::Credited, CreditOutcome::DuplicateSuppressed]
        );
        let jane = registry.get(7).unwrap();
        assert_eq!(jane.trips_as_leader, 1);
        assert_eq!(jane.trips_as_co_leader, 0);
    }

    #[test]
    fn test_credit_trip_cancelled_counts_every_slot() {
        let mut registry = jane_registry();
        let mut resolver = IdentityResolver::new();
        let mut ledger = CreditLedger::new();

        credit_trip(
            &mut registry,
            &mut resolver,
            &mut ledger,
            &trip("C", &["Jane Q Public", "New Person"], &["Jane Q Public"]),
        )
        .unwrap();

        let jane = registry.get(7).unwrap();
        assert_eq!(jane.trips_cancelled, 2);
        assert_eq!(jane.activity(), 0);
        assert!(jane.credited_dates.is_empty());

        let newcomer = registry.get(-1).unwrap();
        assert!(!newcomer.known);
        assert_eq!(newcomer.trips_cancelled, 1);
        assert_eq!(newcomer.trips_as_leader, 0);
    }

    #[test]
    fn test_unknown_status_still_credits() {
        let mut registry = jane_registry();
        let mut resolver = IdentityResolver::new();
        let mut ledger = CreditLedger::new();

        credit_trip(
            &mut registry,
            &mut resolver,
            &mut ledger,
            &trip("X", &[], &["Jane Q Public"]),
        )
        .unwrap();

        assert_eq!(registry.get(7).unwrap().trips_as_co_leader, 1);
    }

    #[test]
    fn test_run_context_starts_fresh() {
        let ctx = RunContext::new(Config::default());

        assert!(ctx.registry.is_empty());
        assert_eq!(ctx.resolver.next_synthetic_id(), -1);
        assert_eq!(ctx.aggregator.date_range(), None);
    }
}
