// 📒 Credit Ledger - per-role trip credit with one guard per person per date
//
// Leading and co-leading share a single set of credited dates. Whoever is
// credited first on a date keeps the credit; any later lead or co-lead
// credit for that person on that date is suppressed and recorded.
// Cancellations bypass the guard entirely.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::entities::Leader;
use crate::error::{CreditRole, DuplicateCredit};

/// What a credit call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditOutcome {
    Credited,
    DuplicateSuppressed,
    Cancelled,
}

/// Applies credits to leaders and keeps the suppressed duplicates
#[derive(Debug, Default)]
pub struct CreditLedger {
    duplicates: Vec<DuplicateCredit>,
    credited: usize,
    cancelled: usize,
}

impl CreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a trip led on `date`
    pub fn credit_lead(&mut self, leader: &mut Leader, date: NaiveDate) -> CreditOutcome {
        self.credit(leader, date, CreditRole::Lead)
    }

    /// Credit a trip co-led on `date`
    pub fn credit_co_lead(&mut self, leader: &mut Leader, date: NaiveDate) -> CreditOutcome {
        self.credit(leader, date, CreditRole::CoLead)
    }

    /// Count a cancelled trip; never guarded by date
    pub fn credit_cancel(&mut self, leader: &mut Leader) -> CreditOutcome {
        leader.trips_cancelled += 1;
        self.cancelled += 1;
        CreditOutcome::Cancelled
    }

    fn credit(&mut self, leader: &mut Leader, date: NaiveDate, role: CreditRole) -> CreditOutcome {
        if !leader.credited_dates.insert(date) {
            warn!(
                "Not giving {} credit for duplicate {} on {}",
                leader.primary_name(),
                role.as_str(),
                date.format("%m/%d/%Y")
            );
            self.duplicates.push(DuplicateCredit {
                leader_id: leader.id,
                name: leader.primary_name().to_string(),
                role,
                date,
            });
            return CreditOutcome::DuplicateSuppressed;
        }

        match role {
            CreditRole::Lead => leader.trips_as_leader += 1,
            CreditRole::CoLead => leader.trips_as_co_leader += 1,
        }
        self.credited += 1;
        CreditOutcome::Credited
    }

    pub fn duplicates(&self) -> &[DuplicateCredit] {
        &self.duplicates
    }

    /// Lead and co-lead credits granted
    pub fn credited(&self) -> usize {
        self.credited
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    fn jane() -> Leader {
        let mut leader = Leader::new(7, "a@x.org");
        leader.names.push("jane_q_public".to_string());
        leader
    }

    #[test]
    fn test_credit_lead() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        assert_eq!(ledger.credit_lead(&mut leader, date(6, 1)), CreditOutcome::Credited);
        assert_eq!(leader.trips_as_leader, 1);
        assert_eq!(leader.activity(), 1);
        assert!(leader.credited_dates.contains(&date(6, 1)));
    }

    #[test]
    fn test_duplicate_lead_same_date_suppressed() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        ledger.credit_lead(&mut leader, date(6, 1));
        let outcome = ledger.credit_lead(&mut leader, date(6, 1));

        assert_eq!(outcome, CreditOutcome::DuplicateSuppressed);
        assert_eq!(leader.trips_as_leader, 1);
        assert_eq!(ledger.duplicates().len(), 1);
        assert_eq!(ledger.duplicates()[0].role, CreditRole::Lead);
    }

    #[test]
    fn test_guard_is_shared_across_roles() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        ledger.credit_lead(&mut leader, date(6, 1));
        let outcome = ledger.credit_co_lead(&mut leader, date(6, 1));

        assert_eq!(outcome, CreditOutcome::DuplicateSuppressed);
        assert_eq!(leader.trips_as_leader, 1);
        assert_eq!(leader.trips_as_co_leader, 0);
        assert_eq!(
            ledger.duplicates()[0],
            DuplicateCredit {
                leader_id: 7,
                name: "jane_q_public".to_string(),
                role: CreditRole::CoLead,
                date: date(6, 1),
            }
        );
    }

    #[test]
    fn test_co_lead_first_blocks_lead() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        ledger.credit_co_lead(&mut leader, date(6, 1));
        ledger.credit_lead(&mut leader, date(6, 1));

        assert_eq!(leader.trips_as_co_leader, 1);
        assert_eq!(leader.trips_as_leader, 0);
    }

    #[test]
    fn test_different_dates_both_credited() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        ledger.credit_lead(&mut leader, date(6, 1));
        ledger.credit_co_lead(&mut leader, date(6, 2));
        ledger.credit_lead(&mut leader, date(6, 3));

        assert_eq!(leader.trips_as_leader, 2);
        assert_eq!(leader.trips_as_co_leader, 1);
        assert_eq!(ledger.credited(), 3);
        assert!(ledger.duplicates().is_empty());
    }

    #[test]
    fn test_cancellations_are_unguarded() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        ledger.credit_lead(&mut leader, date(6, 1));
        assert_eq!(ledger.credit_cancel(&mut leader), CreditOutcome::Cancelled);
        ledger.credit_cancel(&mut leader);

        assert_eq!(leader.trips_cancelled, 2);
        assert_eq!(leader.activity(), 1);
        assert_eq!(leader.credited_dates.len(), 1);
        assert_eq!(ledger.cancelled(), 2);
    }

    #[test]
    fn test_role_credits_equal_credited_dates() {
        let mut ledger = CreditLedger::new();
        let mut leader = jane();

        for day in [1, 1, 2, 3, 3, 3, 5] {
            ledger.credit_lead(&mut leader, date(7, day));
            ledger.credit_co_lead(&mut leader, date(7, day));
        }

        assert_eq!(leader.activity() as usize, leader.credited_dates.len());
    }
}
