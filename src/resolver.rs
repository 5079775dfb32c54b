// 🔎 Identity Resolver - trip name → Leader
//
// Exact key lookup first; an unseen key becomes a synthetic leader with the
// next negative ID (-1, -2, ...). The counter belongs to the resolver, so
// two resolvers over two registries never share IDs.

use tracing::debug;

use crate::entities::{Leader, LeaderRegistry};
use crate::error::{LedgerError, Result};
use crate::names::{normalize, PersonName};

/// Outcome of a single resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Name was already indexed (registry or earlier synthesis)
    Found(i64),
    /// A new synthetic leader was created
    Synthesized(i64),
}

impl Resolution {
    pub fn id(&self) -> i64 {
        match self {
            Resolution::Found(id) | Resolution::Synthesized(id) => *id,
        }
    }
}

#[derive(Debug)]
pub struct IdentityResolver {
    next_synthetic_id: i64,
    synthesized: usize,
}

impl IdentityResolver {
    pub fn new() -> Self {
        IdentityResolver {
            next_synthetic_id: -1,
            synthesized: 0,
        }
    }

    /// ID the next synthesized leader will get
    pub fn next_synthetic_id(&self) -> i64 {
        self.next_synthetic_id
    }

    /// Number of leaders this resolver has synthesized
    pub fn synthesized(&self) -> usize {
        self.synthesized
    }

    /// Resolve a display name to its leader, synthesizing one if needed
    pub fn resolve<'r>(
        &mut self,
        registry: &'r mut LeaderRegistry,
        raw_name: &str,
    ) -> Result<&'r mut Leader> {
        let (_, slot) = self.locate(registry, raw_name)?;
        Ok(registry.slot_mut(slot))
    }

    /// Resolve a display name, reporting whether a leader was created
    pub fn lookup_or_synthesize(
        &mut self,
        registry: &mut LeaderRegistry,
        raw_name: &str,
    ) -> Result<Resolution> {
        self.locate(registry, raw_name).map(|(resolution, _)| resolution)
    }

    /// Resolution plus the arena slot of the resolved leader
    fn locate(
        &mut self,
        registry: &mut LeaderRegistry,
        raw_name: &str,
    ) -> Result<(Resolution, usize)> {
        let key = normalize(raw_name);
        if key.is_empty() {
            return Err(LedgerError::EmptyName);
        }

        if let Some(slot) = registry.slot_by_name(&key) {
            let id = registry.slot(slot).id;
            return Ok((Resolution::Found(id), slot));
        }

        let id = self.allocate_id(registry);
        let name = PersonName::from_key(&key);
        let slot = registry.insert_synthetic(Leader::synthetic(id), key);
        self.synthesized += 1;

        debug!(
            "Synthesized leader {} for unregistered name '{}' ({} {})",
            id, raw_name, name.first, name.last
        );

        Ok((Resolution::Synthesized(id), slot))
    }

    fn allocate_id(&mut self, registry: &LeaderRegistry) -> i64 {
        // Registry IDs are non-negative, this loop only guards hand-built registries
        while registry.contains_id(self.next_synthetic_id) {
            self.next_synthetic_id -= 1;
        }
        let id = self.next_synthetic_id;
        self.next_synthetic_id -= 1;
        id
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_jane() -> LeaderRegistry {
        let mut registry = LeaderRegistry::new();
        registry.get_or_create_known(7, "a@x.org");
        registry.add_name(7, "jane_q_public".to_string());
        registry.add_name(7, "jane_public".to_string());
        registry
    }

    #[test]
    fn test_resolve_known_name() {
        let mut registry = registry_with_jane();
        let mut resolver = IdentityResolver::new();

        let leader = resolver.resolve(&mut registry, "Jane Q Public").unwrap();
        assert_eq!(leader.id, 7);
        assert!(leader.known);
        assert_eq!(resolver.synthesized(), 0);
    }

    #[test]
    fn test_resolve_is_case_and_whitespace_insensitive() {
        let mut registry = registry_with_jane();
        let mut resolver = IdentityResolver::new();

        let result = resolver.lookup_or_synthesize(&mut registry, "  JANE   public ").unwrap();
        assert_eq!(result, Resolution::Found(7));
    }

    #[test]
    fn test_primary_and_alternate_resolve_to_same_leader() {
        let mut registry = registry_with_jane();
        let mut resolver = IdentityResolver::new();

        let primary = resolver.lookup_or_synthesize(&mut registry, "Jane Q Public").unwrap();
        let alternate = resolver.lookup_or_synthesize(&mut registry, "Jane Public").unwrap();
        assert_eq!(primary.id(), alternate.id());
    }

    #[test]
    fn test_synthesize_unknown_name() {
        let mut registry = registry_with_jane();
        let mut resolver = IdentityResolver::new();

        let leader = resolver.resolve(&mut registry, "New Person").unwrap();
        assert_eq!(leader.id, -1);
        assert!(!leader.known);
        assert_eq!(leader.names, vec!["new_person"]);
        assert_eq!(leader.first_name(), "New");
        assert_eq!(leader.last_name(), "Person");

        assert_eq!(registry.get_by_name("new_person").unwrap().id, -1);
        assert_eq!(registry.synthetic_count(), 1);
    }

    #[test]
    fn test_synthetic_ids_strictly_decrease() {
        let mut registry = LeaderRegistry::new();
        let mut resolver = IdentityResolver::new();

        let names = ["Ann Lee", "Bo Diddley", "Carl Sagan", "Ann Lee", "Dee Dee Ramone"];
        let ids: Vec<i64> = names
            .iter()
            .map(|n| resolver.lookup_or_synthesize(&mut registry, n).unwrap().id())
            .collect();

        assert_eq!(ids, vec![-1, -2, -3, -1, -4]);
        assert_eq!(resolver.synthesized(), 4);
        assert_eq!(resolver.next_synthetic_id(), -5);
    }

    #[test]
    fn test_second_sighting_is_found_not_synthesized() {
        let mut registry = LeaderRegistry::new();
        let mut resolver = IdentityResolver::new();

        assert_eq!(
            resolver.lookup_or_synthesize(&mut registry, "New Person").unwrap(),
            Resolution::Synthesized(-1)
        );
        assert_eq!(
            resolver.lookup_or_synthesize(&mut registry, "new person").unwrap(),
            Resolution::Found(-1)
        );
    }

    #[test]
    fn test_three_part_name_last_is_third_part() {
        let mut registry = LeaderRegistry::new();
        let mut resolver = IdentityResolver::new();

        let leader = resolver.resolve(&mut registry, "Mary Ann Evans").unwrap();
        assert_eq!(leader.first_name(), "Mary");
        assert_eq!(leader.last_name(), "Evans");
        assert_eq!(leader.primary_name(), "mary_ann_evans");
    }

    #[test]
    fn test_single_word_name_is_synthesized() {
        let mut registry = LeaderRegistry::new();
        let mut resolver = IdentityResolver::new();

        let leader = resolver.resolve(&mut registry, "Cher").unwrap();
        assert_eq!(leader.primary_name(), "cher");
        assert_eq!(leader.first_name(), "Cher");
        assert_eq!(leader.last_name(), "");
    }

    #[test]
    fn test_resolve_mutates_the_indexed_leader() {
        let mut registry = registry_with_jane();
        let mut resolver = IdentityResolver::new();

        resolver.resolve(&mut registry, "New Person").unwrap().trips_as_leader += 1;
        resolver.resolve(&mut registry, "jane public").unwrap().trips_as_co_leader += 1;
        resolver.resolve(&mut registry, "NEW PERSON").unwrap().trips_cancelled += 1;

        let newcomer = registry.get(-1).unwrap();
        assert_eq!(newcomer.trips_as_leader, 1);
        assert_eq!(newcomer.trips_cancelled, 1);
        assert_eq!(registry.get(7).unwrap().trips_as_co_leader, 1);
        assert_eq!(resolver.synthesized(), 1);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut registry = LeaderRegistry::new();
        let mut resolver = IdentityResolver::new();

        assert!(matches!(
            resolver.lookup_or_synthesize(&mut registry, "   "),
            Err(LedgerError::EmptyName)
        ));
        assert!(registry.is_empty());
        assert_eq!(resolver.next_synthetic_id(), -1);
    }
}
