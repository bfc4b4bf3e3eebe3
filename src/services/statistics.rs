//! Dataset statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::RecordStore;
use crate::models::Gender;

/// Member counts for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationBucket {
    pub count: usize,
    pub male: usize,
    pub female: usize,
    pub explicit: usize,
    pub inferred: usize,
}

/// Aggregate counts over the whole record store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_members: usize,
    pub total_families: usize,
    pub male_count: usize,
    pub female_count: usize,
    pub deceased_count: usize,
    pub alive_count: usize,
    pub with_birth_date: usize,
    pub with_birth_place: usize,
    pub with_burial_place: usize,
    pub with_profession: usize,
    pub with_address: usize,
    pub with_email: usize,
    pub with_phone: usize,
    pub unassigned_generation: usize,
    pub generations: BTreeMap<i32, GenerationBucket>,
    pub phai_distribution: BTreeMap<String, usize>,
    pub chi_distribution: BTreeMap<String, usize>,
    pub min_generation: Option<i32>,
    pub max_generation: Option<i32>,
}

impl Statistics {
    pub fn compute(store: &RecordStore) -> Self {
        let mut stats = Statistics {
            total_members: store.len(),
            total_families: store.family_units().len(),
            ..Default::default()
        };

        for person in store.individuals() {
            match person.gender {
                Some(Gender::Male) => stats.male_count += 1,
                Some(Gender::Female) => stats.female_count += 1,
                None => {}
            }
            if person.is_deceased {
                stats.deceased_count += 1;
            } else {
                stats.alive_count += 1;
            }

            stats.with_birth_date += usize::from(person.birth_date.is_some());
            stats.with_birth_place += usize::from(person.birth_place.is_some());
            stats.with_burial_place += usize::from(person.burial_place.is_some());
            stats.with_profession += usize::from(person.profession.is_some());
            stats.with_address += usize::from(person.address.is_some());
            stats.with_email += usize::from(person.email.is_some());
            stats.with_phone += usize::from(person.phone.is_some());

            match person.generation {
                Some(gen) => {
                    let bucket = stats.generations.entry(gen).or_default();
                    bucket.count += 1;
                    match person.gender {
                        Some(Gender::Male) => bucket.male += 1,
                        Some(Gender::Female) => bucket.female += 1,
                        None => {}
                    }
                    if person.generation_source.is_some_and(|s| s.is_inferred()) {
                        bucket.inferred += 1;
                    } else {
                        bucket.explicit += 1;
                    }
                }
                None => stats.unassigned_generation += 1,
            }

            if let Some(phai) = &person.phai {
                *stats.phai_distribution.entry(phai.clone()).or_default() += 1;
            }
            if let Some(chi) = &person.chi {
                *stats.chi_distribution.entry(chi.clone()).or_default() += 1;
            }
        }

        stats.min_generation = stats.generations.keys().next().copied();
        stats.max_generation = stats.generations.keys().next_back().copied();
        stats
    }

    /// Number of distinct generation values present.
    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenerationSource, Individual};

    #[test]
    fn test_compute_counts() {
        let mut founder = Individual::new("F");
        founder.gender = Some(Gender::Male);
        founder.is_deceased = true;
        founder.generation = Some(1);
        founder.generation_source = Some(GenerationSource::Explicit);
        founder.phai = Some("Nhất".to_string());

        let mut child = Individual::new("C");
        child.gender = Some(Gender::Female);
        child.generation = Some(2);
        child.generation_source = Some(GenerationSource::InferredFromFather);
        child.phai = Some("Nhất".to_string());
        child.chi = Some("3".to_string());
        child.email = Some("c@example.com".to_string());

        let store = RecordStore::build(vec![founder, child, Individual::new("X")]);
        let stats = Statistics::compute(&store);

        assert_eq!(stats.total_members, 3);
        assert_eq!((stats.male_count, stats.female_count), (1, 1));
        assert_eq!((stats.deceased_count, stats.alive_count), (1, 2));
        assert_eq!(stats.with_email, 1);
        assert_eq!(stats.unassigned_generation, 1);
        assert_eq!(stats.min_generation, Some(1));
        assert_eq!(stats.max_generation, Some(2));
        assert_eq!(stats.generation_count(), 2);
        assert_eq!(stats.generations[&1].explicit, 1);
        assert_eq!(stats.generations[&2].inferred, 1);
        assert_eq!(stats.generations[&2].female, 1);
        assert_eq!(stats.phai_distribution["Nhất"], 2);
        assert_eq!(stats.chi_distribution["3"], 1);
    }

    #[test]
    fn test_empty_store() {
        let stats = Statistics::compute(&RecordStore::build(Vec::new()));
        assert_eq!(stats.total_members, 0);
        assert_eq!(stats.min_generation, None);
        assert!(stats.generations.is_empty());
    }
}
