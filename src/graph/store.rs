//! Record store: individuals plus the relationship indices derived from
//! their parent and spouse references.

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{FamilyUnit, Gender, GenerationSource, Individual};

/// References that point at identifiers missing from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DanglingReferences {
    pub father: usize,
    pub mother: usize,
    pub spouse: usize,
}

impl DanglingReferences {
    pub fn total(&self) -> usize {
        self.father + self.mother + self.spouse
    }
}

/// Parsed individuals and the indices derived from them.
///
/// Individuals keep input order, which is also the enumeration order used
/// by propagation and by every index.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    individuals: Vec<Individual>,
    positions: HashMap<String, usize>,
    children_of: HashMap<String, Vec<String>>,
    spouse_of: HashMap<String, Vec<String>>,
    family_units: Vec<FamilyUnit>,
    dangling: DanglingReferences,
}

impl RecordStore {
    /// Index a collection of individuals.
    ///
    /// Dangling parent and spouse references are dropped from the indices
    /// and counted. A repeated identifier replaces the earlier record.
    pub fn build(individuals: Vec<Individual>) -> Self {
        let mut store = Self::default();

        for individual in individuals {
            match store.positions.get(&individual.id) {
                Some(&pos) => store.individuals[pos] = individual,
                None => {
                    store
                        .positions
                        .insert(individual.id.clone(), store.individuals.len());
                    store.individuals.push(individual);
                }
            }
        }

        store.index_children();
        store.index_spouses();
        store.index_family_units();

        tracing::info!(
            "Indexed {} individuals: {} parents, {} family units, {} dangling references",
            store.individuals.len(),
            store.children_of.len(),
            store.family_units.len(),
            store.dangling.total()
        );

        store
    }

    fn index_children(&mut self) {
        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut dangling = DanglingReferences::default();

        for person in &self.individuals {
            let parents = [
                (person.father_id.as_deref(), &mut dangling.father),
                (person.mother_id.as_deref(), &mut dangling.mother),
            ];
            for (parent, counter) in parents {
                let Some(parent) = parent else { continue };
                if !self.contains(parent) {
                    tracing::debug!("{}: parent reference {} not found", person.id, parent);
                    *counter += 1;
                    continue;
                }
                let children = children_of.entry(parent.to_string()).or_default();
                if !children.contains(&person.id) {
                    children.push(person.id.clone());
                }
            }
        }

        self.children_of = children_of;
        self.dangling.father = dangling.father;
        self.dangling.mother = dangling.mother;
    }

    fn index_spouses(&mut self) {
        let mut spouse_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut link = |a: &str, b: &str| {
            let entry = spouse_of.entry(a.to_string()).or_default();
            if !entry.iter().any(|s| s == b) {
                entry.push(b.to_string());
            }
        };

        for person in &self.individuals {
            for spouse in &person.spouse_ids {
                if !self.positions.contains_key(spouse) {
                    tracing::debug!("{}: spouse reference {} not found", person.id, spouse);
                    self.dangling.spouse += 1;
                    continue;
                }
                link(&person.id, spouse);
                link(spouse, &person.id);
            }
        }

        self.spouse_of = spouse_of;
    }

    fn index_family_units(&mut self) {
        let mut units: Vec<FamilyUnit> = Vec::new();
        let mut by_couple: HashMap<(String, String), usize> = HashMap::new();

        for person in &self.individuals {
            let (Some(father), Some(mother)) = (&person.father_id, &person.mother_id) else {
                continue;
            };
            if !self.contains(father) || !self.contains(mother) {
                continue;
            }

            let key = if father <= mother {
                (father.clone(), mother.clone())
            } else {
                (mother.clone(), father.clone())
            };

            let idx = *by_couple.entry(key).or_insert_with(|| {
                let (husband_id, wife_id) = self.couple_roles(father, mother);
                units.push(FamilyUnit {
                    id: format!("F{}", units.len() + 1),
                    husband_id,
                    wife_id,
                    children_ids: Vec::new(),
                });
                units.len() - 1
            });
            units[idx].children_ids.push(person.id.clone());
        }

        self.family_units = units;
    }

    /// Husband is the recorded father, unless the genders show the two
    /// links were entered the other way round.
    fn couple_roles(&self, father: &str, mother: &str) -> (String, String) {
        let gender = |id: &str| self.get(id).and_then(|p| p.gender);
        if gender(father) == Some(Gender::Female) && gender(mother) == Some(Gender::Male) {
            (mother.to_string(), father.to_string())
        } else {
            (father.to_string(), mother.to_string())
        }
    }

    /// Whether an identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Look up an individual by identifier.
    pub fn get(&self, id: &str) -> Option<&Individual> {
        self.positions.get(id).map(|&pos| &self.individuals[pos])
    }

    /// Resolve an optional reference, dropping dangling ones.
    pub fn resolve(&self, id: Option<&str>) -> Option<&Individual> {
        id.and_then(|id| self.get(id))
    }

    /// Individuals in input order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Children of a registered individual, in input order.
    pub fn children_of(&self, id: &str) -> Result<&[String], AppError> {
        if !self.contains(id) {
            return Err(AppError::MissingEntity(id.to_string()));
        }
        Ok(self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Spouses of a registered individual (symmetric).
    pub fn spouses_of(&self, id: &str) -> Result<&[String], AppError> {
        if !self.contains(id) {
            return Err(AppError::MissingEntity(id.to_string()));
        }
        Ok(self.spouse_of.get(id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Whether anyone records this individual as father or mother.
    pub fn is_parent(&self, id: &str) -> bool {
        self.children_of.get(id).is_some_and(|c| !c.is_empty())
    }

    pub fn family_units(&self) -> &[FamilyUnit] {
        &self.family_units
    }

    pub fn dangling(&self) -> DanglingReferences {
        self.dangling
    }

    /// Record a generation on an individual that has none.
    ///
    /// Returns false, leaving the record untouched, when the individual is
    /// unknown or already has a generation.
    pub(crate) fn assign_generation(
        &mut self,
        id: &str,
        generation: i32,
        source: GenerationSource,
        inferred_from: Option<String>,
    ) -> bool {
        let Some(&pos) = self.positions.get(id) else {
            return false;
        };
        let person = &mut self.individuals[pos];
        if person.generation.is_some() {
            return false;
        }
        person.generation = Some(generation);
        person.generation_source = Some(source);
        person.inferred_from = inferred_from;
        true
    }

    /// Serializable view of every individual with its derived children.
    pub fn persons(&self) -> PersonsView<'_> {
        PersonsView(self)
    }
}

/// Serializes individuals as an id-keyed map in input order, each with its
/// derived `children_ids`.
pub struct PersonsView<'a>(&'a RecordStore);

#[derive(Serialize)]
struct PersonRecord<'a> {
    #[serde(flatten)]
    individual: &'a Individual,
    children_ids: &'a [String],
}

impl Serialize for PersonsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let store = self.0;
        let mut map = serializer.serialize_map(Some(store.len()))?;
        for person in store.individuals() {
            let children_ids = store
                .children_of
                .get(&person.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            map.serialize_entry(
                &person.id,
                &PersonRecord {
                    individual: person,
                    children_ids,
                },
            )?;
        }
        map.end()
    }
}
