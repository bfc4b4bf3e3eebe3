//! Validation service for checking lineage integrity.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::context::Context;
use crate::graph::{Clan, RecordStore};
use crate::models::{ChainLink, Finding, FindingKind, Individual, LineageTrace};

/// Result of lineage validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether the graph passed all checks.
    pub valid: bool,
    /// Total number of findings.
    pub issue_count: usize,
    /// Children whose generation is not father + 1.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gen_mismatches: Vec<Finding>,
    /// Clan members without any family link.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<Finding>,
    /// Empty or placeholder given names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_names: Vec<Finding>,
    /// Root-cause traces for implausible generations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<LineageTrace>,
}

impl ValidationReport {
    /// All findings, mismatches first.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.gen_mismatches
            .iter()
            .chain(&self.invalid_names)
            .chain(&self.orphans)
    }
}

/// Service for detecting anomalies in the propagated family graph.
///
/// Read-only: it never changes the store, it only produces findings. Every
/// check collects all of its findings rather than stopping at the first.
#[derive(Clone)]
pub struct ValidationService {
    store: Arc<RecordStore>,
    config: Arc<Config>,
    clan: Clan,
}

impl From<&Context> for ValidationService {
    fn from(ctx: &Context) -> Self {
        Self {
            store: ctx.store.clone(),
            config: ctx.config.clone(),
            clan: ctx.clan.clone(),
        }
    }
}

impl ValidationService {
    /// Run every enabled check and the root-cause tracing.
    pub fn validate(&self) -> ValidationReport {
        let checks = &self.config.validation;

        let gen_mismatches = if checks.check_generation_mismatch {
            self.find_generation_mismatches()
        } else {
            Vec::new()
        };
        let orphans = if checks.check_orphans {
            self.find_orphans()
        } else {
            Vec::new()
        };
        let invalid_names = if checks.check_names {
            self.find_invalid_names()
        } else {
            Vec::new()
        };
        let traces = self.trace_implausible_generations();

        let issue_count = gen_mismatches.len() + orphans.len() + invalid_names.len();
        tracing::info!(
            "Validation found {} issues ({} generation mismatches, {} invalid names, {} orphans)",
            issue_count,
            gen_mismatches.len(),
            invalid_names.len(),
            orphans.len()
        );

        ValidationReport {
            valid: issue_count == 0,
            issue_count,
            gen_mismatches,
            orphans,
            invalid_names,
            traces,
        }
    }

    /// Find children whose generation is not exactly father's + 1.
    ///
    /// Each child is checked against its own father once, so every
    /// violation produces exactly one finding.
    pub fn find_generation_mismatches(&self) -> Vec<Finding> {
        self.store
            .individuals()
            .iter()
            .filter_map(|person| {
                let actual = person.generation?;
                let father = self.store.resolve(person.father_id.as_deref())?;
                let father_generation = father.generation?;
                let expected = father_generation.checked_add(1)?;
                if actual == expected {
                    return None;
                }
                let message = format!(
                    "{} is recorded as generation {} but father {} is generation {}, so the child should be generation {}",
                    person.display_name(),
                    actual,
                    father.display_name(),
                    father_generation,
                    expected
                );
                Some(Finding::new(
                    FindingKind::GenMismatch {
                        father_id: father.id.clone(),
                        father_name: father.display_name(),
                        father_generation,
                        actual,
                        expected,
                    },
                    &person.id,
                    person.display_name(),
                    message,
                ))
            })
            .collect()
    }

    /// Find clan members with no resolvable parent who are nobody's parent.
    ///
    /// Non-members (spouses marrying in) are expected to be disconnected,
    /// and the founder is the root by definition.
    pub fn find_orphans(&self) -> Vec<Finding> {
        let founder = self.config.lineage.founder_id.as_str();
        self.store
            .individuals()
            .iter()
            .filter(|person| person.id != founder)
            .filter(|person| self.clan.is_member(person))
            .filter(|person| {
                self.store.resolve(person.father_id.as_deref()).is_none()
                    && self.store.resolve(person.mother_id.as_deref()).is_none()
                    && !self.store.is_parent(&person.id)
            })
            .map(|person| {
                Finding::new(
                    FindingKind::Orphan,
                    &person.id,
                    person.display_name(),
                    format!("{} has no links to anyone in the family tree", person.display_name()),
                )
            })
            .collect()
    }

    /// Find individuals whose given name is empty or a placeholder.
    pub fn find_invalid_names(&self) -> Vec<Finding> {
        self.store
            .individuals()
            .iter()
            .filter(|person| self.is_placeholder_name(&person.name))
            .map(|person| {
                Finding::new(
                    FindingKind::InvalidName {
                        name: person.name.clone(),
                    },
                    &person.id,
                    person.display_name(),
                    format!("Invalid name: '{}'", person.name),
                )
            })
            .collect()
    }

    fn is_placeholder_name(&self, name: &str) -> bool {
        let name = name.trim();
        name.is_empty()
            || self
                .config
                .validation
                .placeholder_names
                .iter()
                .any(|p| p == name)
    }

    /// Walk father links from `person_id` up to `founder_id`.
    ///
    /// Returns the chain ordered founder first, or `None` when the walk hits
    /// a cycle, a dangling reference, or an individual without a father
    /// before reaching the founder.
    pub fn trace_ancestor_chain(&self, person_id: &str, founder_id: &str) -> Option<Vec<&Individual>> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(person_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                tracing::debug!("Cycle in father chain of {} at {}", person_id, id);
                return None;
            }
            let person = self.store.get(id)?;
            chain.push(person);
            if id == founder_id {
                chain.reverse();
                return Some(chain);
            }
            current = person.father_id.as_deref();
        }

        None
    }

    /// Re-derive expected generations along the father chain of `person_id`.
    ///
    /// The expected value of each link is its distance from the founder,
    /// anchored at the founder's recorded generation (1 when unrecorded).
    /// Only explicitly recorded values are compared. Returns `None` when
    /// there is no chain or the numbering would leave the `i32` range.
    pub fn annotate_chain(&self, person_id: &str) -> Option<Vec<ChainLink>> {
        let chain = self.trace_ancestor_chain(person_id, &self.config.lineage.founder_id)?;
        let anchor = chain
            .first()
            .filter(|founder| founder.has_explicit_generation())
            .and_then(|founder| founder.generation)
            .unwrap_or(1);

        chain
            .iter()
            .enumerate()
            .map(|(depth, person)| {
                let expected = anchor.checked_add(i32::try_from(depth).ok()?)?;
                let recorded = person
                    .has_explicit_generation()
                    .then_some(person.generation)
                    .flatten();
                Some(ChainLink {
                    id: person.id.clone(),
                    name: person.display_name(),
                    recorded,
                    expected,
                    conflict: recorded.is_some_and(|r| r != expected),
                })
            })
            .collect()
    }

    /// Root-cause traces for everyone whose generation is below the
    /// configured plausibility floor.
    pub fn trace_implausible_generations(&self) -> Vec<LineageTrace> {
        let floor = self.config.validation.implausible_below;
        self.store
            .individuals()
            .iter()
            .filter_map(|person| {
                let computed = person.generation.filter(|g| *g < floor)?;
                Some(LineageTrace {
                    person_id: person.id.clone(),
                    person_name: person.display_name(),
                    computed,
                    chain: self.annotate_chain(&person.id),
                })
            })
            .collect()
    }
}
