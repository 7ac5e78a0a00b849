//! City and city visit models

use serde::{Deserialize, Serialize};

use super::DateRange;

/// Identifier of a city as handed out by the city search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u64);

impl std::fmt::Display for CityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        )
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }
}

/// A resolved city, as returned by a city search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

impl City {
    #[must_use]
    pub fn new(id: CityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            coordinates: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// One city plus the stay spent there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityVisit {
    pub city_id: CityId,
    pub city_name: String,
    pub date_range: DateRange,
    pub coordinates: Option<Coordinates>,
}

impl CityVisit {
    #[must_use]
    pub fn new(city: City, date_range: DateRange) -> Self {
        Self {
            city_id: city.id,
            city_name: city.name,
            date_range,
            coordinates: city.coordinates,
        }
    }

    /// The city this visit refers to
    #[must_use]
    pub fn city(&self) -> City {
        City {
            id: self.city_id,
            name: self.city_name.clone(),
            coordinates: self.coordinates,
        }
    }
}

/// Sum of distances between consecutive visits that both carry coordinates
#[must_use]
pub fn total_distance_km(visits: &[CityVisit]) -> f64 {
    visits
        .windows(2)
        .filter_map(|pair| match (&pair[0].coordinates, &pair[1].coordinates) {
            (Some(from), Some(to)) => Some(from.distance_km(to)),
            _ => None,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stay(a: u32, d: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, a).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_rounded_coordinates() {
        let coords = Coordinates::new(52.229_676, 21.012_229);
        assert_eq!(coords.rounded(2), (52.23, 21.01));
    }

    #[test]
    fn test_visit_keeps_city_fields() {
        let city = City::new(CityId(7), "Kraków").with_coordinates(Coordinates::new(50.06, 19.94));
        let visit = CityVisit::new(city.clone(), stay(1, 3));
        assert_eq!(visit.city_id, CityId(7));
        assert_eq!(visit.city_name, "Kraków");
        assert_eq!(visit.city(), city);
    }

    #[test]
    fn test_total_distance_skips_visits_without_coordinates() {
        let warsaw = City::new(CityId(1), "Warsaw").with_coordinates(Coordinates::new(52.23, 21.01));
        let unknown = City::new(CityId(2), "Nowhere");
        let krakow = City::new(CityId(3), "Kraków").with_coordinates(Coordinates::new(50.06, 19.94));

        let visits = vec![
            CityVisit::new(warsaw.clone(), stay(1, 2)),
            CityVisit::new(krakow.clone(), stay(2, 4)),
            CityVisit::new(unknown, stay(4, 5)),
        ];
        let distance = total_distance_km(&visits);
        // Warsaw to Kraków is roughly 250 km
        assert!((240.0..260.0).contains(&distance), "got {distance}");

        assert_eq!(total_distance_km(&visits[..1]), 0.0);
    }
}
