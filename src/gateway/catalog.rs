//! Fixed list of known cities with substring search, served offline when
//! `search.backend = "catalog"`

use async_trait::async_trait;

use super::CitySearch;
use crate::Result;
use crate::models::City;

/// Cities known up front, searched case-insensitively by name
#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    #[must_use]
    pub fn new(mut cities: Vec<City>) -> Self {
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Self { cities }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Matching cities in name order; an empty term matches everything
    #[must_use]
    pub fn matching(&self, term: &str) -> Vec<City> {
        let needle = term.trim().to_lowercase();
        self.cities
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CitySearch for CityCatalog {
    async fn search(&self, term: &str) -> Result<Vec<City>> {
        Ok(self.matching(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CityId;
    use rstest::rstest;

    fn catalog() -> CityCatalog {
        CityCatalog::new(vec![
            City::new(CityId(1), "Warszawa"),
            City::new(CityId(2), "Kraków"),
            City::new(CityId(3), "Wrocław"),
        ])
    }

    #[rstest]
    #[case("w", vec!["Kraków", "Warszawa", "Wrocław"])]
    #[case("WAR", vec!["Warszawa"])]
    #[case("  kra ", vec!["Kraków"])]
    #[case("", vec!["Kraków", "Warszawa", "Wrocław"])]
    #[case("berlin", vec![])]
    fn test_matching(#[case] term: &str, #[case] expected: Vec<&str>) {
        let names: Vec<_> = catalog().matching(term).into_iter().map(|c| c.name).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_search_trait() {
        let found = catalog().search("wro").await.unwrap();
        assert_eq!(found[0].id, CityId(3));
    }
}
