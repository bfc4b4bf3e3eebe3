//! Generation propagation engine.
//!
//! Assigns a generation number to every individual reachable, through
//! resolvable parent or child links, from someone whose generation is known.
//!
//! # Policy
//!
//! Each pass walks the individuals in store order. An individual that
//! already has a generation is skipped entirely, so explicit values (and
//! earlier inferences) are never overwritten. Otherwise the rules in
//! [`InferenceRule::ORDER`] are tried in turn and the first one that
//! produces a value wins:
//!
//! 1. [`InferenceRule::FromFather`]: father's generation + 1
//! 2. [`InferenceRule::FromMother`]: mother's generation + 1, clan mothers only
//! 3. [`InferenceRule::FromChild`]: first child (store order) with a
//!    generation, minus 1
//!
//! A pass is a pure function from the current assignments to the next ones
//! plus a change count. Values assigned earlier in a pass are visible to
//! later individuals of the same pass. [`PropagationEngine::run`] repeats
//! passes until one makes no change or the pass cap is hit; hitting the cap
//! is not an error, the remaining individuals just stay unassigned.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::clan::Clan;
use crate::graph::store::RecordStore;
use crate::models::{GenerationSource, Individual};

/// A generation value together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub generation: i32,
    pub source: GenerationSource,
    /// Relative the value was derived from; `None` for explicit values.
    pub inferred_from: Option<String>,
}

/// Generation assignments keyed by individual id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generations(HashMap<String, Assignment>);

impl Generations {
    /// Collect the generations already present on the store's records.
    pub fn seed(store: &RecordStore) -> Self {
        let map = store
            .individuals()
            .iter()
            .filter_map(|p| {
                let generation = p.generation?;
                Some((
                    p.id.clone(),
                    Assignment {
                        generation,
                        source: p.generation_source.unwrap_or(GenerationSource::Explicit),
                        inferred_from: p.inferred_from.clone(),
                    },
                ))
            })
            .collect();
        Self(map)
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.0.get(id)
    }

    pub fn generation(&self, id: &str) -> Option<i32> {
        self.0.get(id).map(|a| a.generation)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, id: String, assignment: Assignment) {
        self.0.insert(id, assignment);
    }
}

/// One way of deriving a generation from a relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceRule {
    FromFather,
    FromMother,
    FromChild,
}

impl InferenceRule {
    /// Rules in priority order.
    pub const ORDER: [InferenceRule; 3] = [
        InferenceRule::FromFather,
        InferenceRule::FromMother,
        InferenceRule::FromChild,
    ];

    /// Try to derive a generation for `person` from the current assignments.
    ///
    /// A value that would leave the `i32` range is not derived.
    pub fn infer(
        &self,
        person: &Individual,
        store: &RecordStore,
        generations: &Generations,
        clan: &Clan,
    ) -> Option<Assignment> {
        match self {
            InferenceRule::FromFather => {
                let father = store.resolve(person.father_id.as_deref())?;
                let generation = generations.generation(&father.id)?.checked_add(1)?;
                Some(Assignment {
                    generation,
                    source: GenerationSource::InferredFromFather,
                    inferred_from: Some(father.id.clone()),
                })
            }
            InferenceRule::FromMother => {
                let mother = store.resolve(person.mother_id.as_deref())?;
                if !clan.is_member(mother) {
                    return None;
                }
                let generation = generations.generation(&mother.id)?.checked_add(1)?;
                Some(Assignment {
                    generation,
                    source: GenerationSource::InferredFromMother,
                    inferred_from: Some(mother.id.clone()),
                })
            }
            InferenceRule::FromChild => {
                let children = store.children_of(&person.id).ok()?;
                children.iter().find_map(|child| {
                    let generation = generations.generation(child)?.checked_sub(1)?;
                    Some(Assignment {
                        generation,
                        source: GenerationSource::InferredFromChild,
                        inferred_from: Some(child.clone()),
                    })
                })
            }
        }
    }
}

/// Result of a single pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub generations: Generations,
    /// Number of individuals assigned during the pass.
    pub changes: usize,
}

/// Summary of a full propagation run.
#[derive(Debug, Clone, Serialize)]
pub struct PropagationReport {
    /// Passes executed, including the final no-change pass.
    pub passes: usize,
    /// False when the pass cap was reached before a fixed point.
    pub converged: bool,
    pub explicit: usize,
    pub inferred: usize,
    /// Individuals with no path to any known generation.
    pub unassigned: usize,
}

/// Fixed-point generation inference over a record store.
#[derive(Clone)]
pub struct PropagationEngine {
    rules: Vec<InferenceRule>,
    max_passes: usize,
    clan: Clan,
}

impl PropagationEngine {
    /// Engine with the standard rule order.
    pub fn new(clan: Clan, max_passes: usize) -> Self {
        Self {
            rules: InferenceRule::ORDER.to_vec(),
            max_passes,
            clan,
        }
    }

    /// Replace the rule list (evaluated in the given order).
    pub fn with_rules(mut self, rules: Vec<InferenceRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Run one pass over every individual.
    pub fn pass(&self, store: &RecordStore, current: &Generations) -> PassOutcome {
        let mut generations = current.clone();
        let mut changes = 0;

        for person in store.individuals() {
            if generations.contains(&person.id) {
                continue;
            }
            let inferred = self
                .rules
                .iter()
                .find_map(|rule| rule.infer(person, store, &generations, &self.clan));
            if let Some(assignment) = inferred {
                generations.insert(person.id.clone(), assignment);
                changes += 1;
            }
        }

        PassOutcome {
            generations,
            changes,
        }
    }

    /// Iterate passes from the store's current generations to a fixed
    /// point or the pass cap, without touching the store.
    pub fn solve(&self, store: &RecordStore) -> (Generations, usize, bool) {
        let mut generations = Generations::seed(store);
        let mut passes = 0;

        while passes < self.max_passes {
            let outcome = self.pass(store, &generations);
            passes += 1;
            tracing::debug!("Propagation pass {}: {} assignments", passes, outcome.changes);
            generations = outcome.generations;
            if outcome.changes == 0 {
                return (generations, passes, true);
            }
        }

        tracing::warn!(
            "Propagation stopped at the {}-pass cap before reaching a fixed point",
            self.max_passes
        );
        (generations, passes, false)
    }

    /// Propagate generations and record them on the store's individuals.
    ///
    /// Only individuals without a generation are written to.
    pub fn run(&self, store: &mut RecordStore) -> PropagationReport {
        tracing::info!("Propagating generations...");
        let (generations, passes, converged) = self.solve(store);

        let pending: Vec<(String, Assignment)> = store
            .individuals()
            .iter()
            .filter(|p| p.generation.is_none())
            .filter_map(|p| Some((p.id.clone(), generations.get(&p.id)?.clone())))
            .collect();
        for (id, assignment) in pending {
            store.assign_generation(
                &id,
                assignment.generation,
                assignment.source,
                assignment.inferred_from,
            );
        }

        let report = Self::summarize(store, passes, converged);
        tracing::info!(
            "Propagation finished after {} passes: {} explicit, {} inferred, {} unassigned",
            report.passes,
            report.explicit,
            report.inferred,
            report.unassigned
        );
        report
    }

    fn summarize(store: &RecordStore, passes: usize, converged: bool) -> PropagationReport {
        let mut report = PropagationReport {
            passes,
            converged,
            explicit: 0,
            inferred: 0,
            unassigned: 0,
        };
        for person in store.individuals() {
            match (person.generation, person.generation_source) {
                (None, _) => report.unassigned += 1,
                (Some(_), Some(source)) if source.is_inferred() => report.inferred += 1,
                (Some(_), _) => report.explicit += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::clan::surname_contains;

    fn person(id: &str, father: Option<&str>, mother: Option<&str>) -> Individual {
        let mut p = Individual::new(id);
        p.surname = "Đặng".to_string();
        p.father_id = father.map(String::from);
        p.mother_id = mother.map(String::from);
        p
    }

    fn explicit(mut p: Individual, generation: i32) -> Individual {
        p.generation = Some(generation);
        p.generation_source = Some(GenerationSource::Explicit);
        p
    }

    fn engine() -> PropagationEngine {
        PropagationEngine::new(surname_contains("Đặng"), 20)
    }

    #[test]
    fn test_infer_from_father() {
        let mut store = RecordStore::build(vec![
            explicit(person("F", None, None), 1),
            person("C", Some("F"), None),
        ]);
        let report = engine().run(&mut store);
        let child = store.get("C").unwrap();
        assert_eq!(child.generation, Some(2));
        assert_eq!(child.generation_source, Some(GenerationSource::InferredFromFather));
        assert_eq!(child.inferred_from.as_deref(), Some("F"));
        assert!(report.converged);
        assert_eq!(report.explicit, 1);
        assert_eq!(report.inferred, 1);
    }

    #[test]
    fn test_mother_rule_requires_clan_surname() {
        let mut outsider = explicit(person("M2", None, None), 4);
        outsider.surname = "Nguyễn".to_string();
        let mut store = RecordStore::build(vec![
            explicit(person("M1", None, None), 4),
            outsider,
            person("C1", None, Some("M1")),
            person("C2", None, Some("M2")),
        ]);
        engine().run(&mut store);
        let c1 = store.get("C1").unwrap();
        assert_eq!(c1.generation, Some(5));
        assert_eq!(c1.generation_source, Some(GenerationSource::InferredFromMother));
        assert_eq!(store.get("C2").unwrap().generation, None);
    }

    #[test]
    fn test_father_rule_beats_mother_rule() {
        let mut store = RecordStore::build(vec![
            explicit(person("F", None, None), 3),
            explicit(person("M", None, None), 7),
            person("C", Some("F"), Some("M")),
        ]);
        engine().run(&mut store);
        let c = store.get("C").unwrap();
        assert_eq!(c.generation, Some(4));
        assert_eq!(c.generation_source, Some(GenerationSource::InferredFromFather));
    }

    #[test]
    fn test_infer_from_first_child() {
        let mut store = RecordStore::build(vec![
            person("P", None, None),
            explicit(person("C1", Some("P"), None), 6),
            explicit(person("C2", Some("P"), None), 9),
        ]);
        engine().run(&mut store);
        let parent = store.get("P").unwrap();
        assert_eq!(parent.generation, Some(5));
        assert_eq!(parent.generation_source, Some(GenerationSource::InferredFromChild));
        assert_eq!(parent.inferred_from.as_deref(), Some("C1"));
    }

    #[test]
    fn test_custom_rule_list() {
        let mut store = RecordStore::build(vec![
            person("P", None, None),
            explicit(person("C", Some("P"), None), 6),
        ]);
        engine()
            .with_rules(vec![InferenceRule::FromFather])
            .run(&mut store);
        assert_eq!(store.get("P").unwrap().generation, None);
    }

    #[test]
    fn test_explicit_values_are_never_overwritten() {
        let mut store = RecordStore::build(vec![
            explicit(person("F", None, None), 1),
            explicit(person("C", Some("F"), None), 5),
            explicit(person("G", Some("C"), None), 2),
        ]);
        engine().run(&mut store);
        for (id, gen) in [("F", 1), ("C", 5), ("G", 2)] {
            let p = store.get(id).unwrap();
            assert_eq!(p.generation, Some(gen));
            assert_eq!(p.generation_source, Some(GenerationSource::Explicit));
        }
    }

    #[test]
    fn test_deep_chain_and_upward_inference() {
        // Founder chain of 8 listed in reverse order, plus an ancestor above
        let mut people = vec![person("ROOT", None, None)];
        for i in (1..8).rev() {
            people.push(person(&format!("G{i}"), Some(&format!("G{}", i - 1)), None));
        }
        people.push(explicit(person("G0", Some("ROOT"), None), 1));
        let mut store = RecordStore::build(people);

        let report = engine().run(&mut store);
        assert!(report.converged);
        assert_eq!(report.unassigned, 0);
        assert_eq!(store.get("G7").unwrap().generation, Some(8));
        assert_eq!(store.get("ROOT").unwrap().generation, Some(0));
        assert_eq!(
            store.get("ROOT").unwrap().generation_source,
            Some(GenerationSource::InferredFromChild)
        );
    }

    #[test]
    fn test_unreachable_individuals_are_counted() {
        let mut store = RecordStore::build(vec![
            explicit(person("F", None, None), 1),
            person("LONER", None, None),
            person("DANGLING", Some("GHOST"), None),
        ]);
        let report = engine().run(&mut store);
        assert_eq!(report.unassigned, 2);
        assert!(store.get("LONER").unwrap().generation.is_none());
    }

    #[test]
    fn test_additional_passes_change_nothing() {
        let mut store = RecordStore::build(vec![
            explicit(person("F", None, None), 1),
            person("C", Some("F"), None),
            person("GC", Some("C"), None),
            person("UP", None, None),
            person("X", Some("UP"), None),
        ]);
        let engine = engine();
        engine.run(&mut store);
        let before = store.clone();

        let seeded = Generations::seed(&store);
        let outcome = engine.pass(&store, &seeded);
        assert_eq!(outcome.changes, 0);
        assert_eq!(outcome.generations, seeded);

        let report = engine.run(&mut store);
        assert_eq!(report.passes, 1);
        assert_eq!(store.individuals(), before.individuals());
    }

    #[test]
    fn test_father_cycle_terminates() {
        let mut store = RecordStore::build(vec![
            person("A", Some("C"), None),
            person("B", Some("A"), None),
            person("C", Some("B"), None),
            explicit(person("F", None, None), 1),
        ]);
        let report = engine().run(&mut store);
        assert!(report.converged);
        assert!(report.passes <= 20);
        assert_eq!(report.unassigned, 3);
    }

    #[test]
    fn test_cycle_with_known_member_terminates() {
        // A's own father (C) gets a higher generation, but A is never rewritten
        let mut store = RecordStore::build(vec![
            explicit(person("A", Some("C"), None), 3),
            person("B", Some("A"), None),
            person("C", Some("B"), None),
        ]);
        let report = PropagationEngine::new(surname_contains("Đặng"), 3).run(&mut store);
        assert!(report.passes <= 3);
        assert_eq!(store.get("B").unwrap().generation, Some(4));
        assert_eq!(store.get("C").unwrap().generation, Some(5));
    }

    #[test]
    fn test_pass_cap_leaves_remaining_unassigned() {
        // Listed child-first so each pass only extends the frontier by one hop
        let mut store = RecordStore::build(vec![
            person("G3", Some("G2"), None),
            person("G2", Some("G1"), None),
            person("G1", Some("G0"), None),
            explicit(person("G0", None, None), 1),
        ]);
        let report = PropagationEngine::new(surname_contains("Đặng"), 2).run(&mut store);
        assert!(!report.converged);
        assert_eq!(report.passes, 2);
        assert_eq!(store.get("G2").unwrap().generation, Some(3));
        assert_eq!(store.get("G3").unwrap().generation, None);
    }

    #[test]
    fn test_generation_at_i32_bounds_is_not_propagated() {
        let mut store = RecordStore::build(vec![
            explicit(person("TOP", None, None), i32::MAX),
            person("C", Some("TOP"), None),
            person("P", None, None),
            explicit(person("K", Some("P"), None), i32::MIN),
        ]);
        let report = engine().run(&mut store);
        assert!(report.converged);
        assert_eq!(store.get("C").unwrap().generation, None);
        assert_eq!(store.get("P").unwrap().generation, None);
        assert_eq!(report.unassigned, 2);
    }
}
