//! Lookup of configured cities.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use crate::model::{City, CitySummary};

pub trait CityRepository: Send + Sync + Debug {
    /// All cities, ascending by id.
    fn find_all(&self) -> Vec<City>;

    /// Cities for the given ids, in the order the ids were given.
    ///
    /// Unknown ids are skipped. A repeated id resolves once, at its first position.
    fn find_by_ids(&self, ids: &[i64]) -> Vec<City>;

    /// Summaries of all cities, ordered by name.
    fn list_summaries(&self) -> Vec<CitySummary> {
        let mut summaries: Vec<CitySummary> =
            self.find_all().iter().map(CitySummary::from).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

/// City directory held in memory, usually built from the `[[cities]]` config table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCityRepository {
    cities: Vec<City>,
    index: HashMap<i64, usize>,
}

impl InMemoryCityRepository {
    pub fn new(cities: impl IntoIterator<Item = City>) -> Self {
        let mut cities: Vec<City> = cities.into_iter().collect();
        cities.sort_by_key(|c| c.id);
        // Config validation rejects duplicate ids; keep the first one if it slipped through.
        cities.dedup_by_key(|c| c.id);

        let index = cities.iter().enumerate().map(|(i, c)| (c.id, i)).collect();

        Self { cities, index }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl CityRepository for InMemoryCityRepository {
    fn find_all(&self) -> Vec<City> {
        self.cities.clone()
    }

    fn find_by_ids(&self, ids: &[i64]) -> Vec<City> {
        let mut seen = HashSet::with_capacity(ids.len());

        ids.iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| self.index.get(id).map(|&i| self.cities[i].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: i64, name: &str) -> City {
        City {
            id,
            name: name.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            timezone: "UTC".to_string(),
        }
    }

    fn repo() -> InMemoryCityRepository {
        InMemoryCityRepository::new([city(3, "Berlin"), city(1, "Kyiv"), city(2, "London")])
    }

    fn ids(cities: &[City]) -> Vec<i64> {
        cities.iter().map(|c| c.id).collect()
    }

    #[test]
    fn find_all_is_ordered_by_id() {
        assert_eq!(ids(&repo().find_all()), vec![1, 2, 3]);
    }

    #[test]
    fn find_by_ids_follows_request_order() {
        assert_eq!(ids(&repo().find_by_ids(&[3, 1])), vec![3, 1]);
    }

    #[test]
    fn find_by_ids_drops_unknown_ids() {
        assert_eq!(ids(&repo().find_by_ids(&[42, 2, 7])), vec![2]);
        assert!(repo().find_by_ids(&[99]).is_empty());
    }

    #[test]
    fn find_by_ids_resolves_repeated_id_once() {
        assert_eq!(ids(&repo().find_by_ids(&[2, 1, 2])), vec![2, 1]);
    }

    #[test]
    fn summaries_are_ordered_by_name() {
        let names: Vec<String> = repo().list_summaries().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Berlin", "Kyiv", "London"]);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let repo = InMemoryCityRepository::new([city(1, "Kyiv"), city(1, "Lviv")]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_all()[0].name, "Kyiv");
    }
}
