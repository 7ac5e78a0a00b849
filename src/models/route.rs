//! Route model: a persisted, named snapshot of an itinerary

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CityVisit, ForecastQuery, city};
use crate::{Result, RoutecastError};

/// Opaque route identifier, generated when a route is first saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(Uuid);

impl RouteId {
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for RouteId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RouteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A saved itinerary.
///
/// Cities and the derived start/end dates are fixed once created; only the
/// name and the forecast timestamp change, through [`RoutePatch`]. Stored
/// routes go through the same checks as new ones when read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredRoute", into = "StoredRoute")]
pub struct Route {
    id: RouteId,
    name: String,
    cities: Vec<CityVisit>,
    created_at: DateTime<Utc>,
    starts_at: NaiveDate,
    ends_at: NaiveDate,
    last_forecast_update: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct StoredRoute {
    id: RouteId,
    name: String,
    cities: Vec<CityVisit>,
    created_at: DateTime<Utc>,
    starts_at: NaiveDate,
    ends_at: NaiveDate,
    last_forecast_update: Option<DateTime<Utc>>,
}

impl TryFrom<StoredRoute> for Route {
    type Error = RoutecastError;

    /// Start and end are derived from the cities again, whatever was stored
    fn try_from(stored: StoredRoute) -> Result<Self> {
        let (starts_at, ends_at) = span(&stored.cities)?;
        Ok(Self {
            id: stored.id,
            name: normalize_name(&stored.name)?,
            cities: stored.cities,
            created_at: stored.created_at,
            starts_at,
            ends_at,
            last_forecast_update: stored.last_forecast_update,
        })
    }
}

impl From<Route> for StoredRoute {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            name: route.name,
            cities: route.cities,
            created_at: route.created_at,
            starts_at: route.starts_at,
            ends_at: route.ends_at,
            last_forecast_update: route.last_forecast_update,
        }
    }
}

/// First arrival and last departure of a non-empty city sequence
fn span(cities: &[CityVisit]) -> Result<(NaiveDate, NaiveDate)> {
    match (cities.first(), cities.last()) {
        (Some(first), Some(last)) => Ok((first.date_range.arrival(), last.date_range.departure())),
        _ => Err(RoutecastError::EmptyItinerary),
    }
}

/// Partial update of the mutable route fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePatch {
    pub name: Option<String>,
    pub last_forecast_update: Option<DateTime<Utc>>,
}

impl RoutePatch {
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn forecast_updated(at: DateTime<Utc>) -> Self {
        Self {
            last_forecast_update: Some(at),
            ..Self::default()
        }
    }
}

/// Trim a route name, rejecting blank ones
pub(crate) fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RoutecastError::InvalidName);
    }
    Ok(trimmed.to_string())
}

impl Route {
    /// Build a new route with a fresh id from a non-empty city sequence
    pub fn new(name: &str, cities: Vec<CityVisit>) -> Result<Self> {
        let (starts_at, ends_at) = span(&cities)?;
        let name = normalize_name(name)?;

        Ok(Self {
            id: RouteId::new(),
            name,
            starts_at,
            ends_at,
            cities,
            created_at: Utc::now(),
            last_forecast_update: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> RouteId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn cities(&self) -> &[CityVisit] {
        &self.cities
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn starts_at(&self) -> NaiveDate {
        self.starts_at
    }

    #[must_use]
    pub fn ends_at(&self) -> NaiveDate {
        self.ends_at
    }

    #[must_use]
    pub fn last_forecast_update(&self) -> Option<DateTime<Utc>> {
        self.last_forecast_update
    }

    /// Visits with their 1-indexed position in the route
    pub fn stops(&self) -> impl Iterator<Item = (usize, &CityVisit)> {
        self.cities.iter().enumerate().map(|(i, visit)| (i + 1, visit))
    }

    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        city::total_distance_km(&self.cities)
    }

    #[must_use]
    pub fn forecast_queries(&self) -> Vec<ForecastQuery> {
        self.cities.iter().map(ForecastQuery::from).collect()
    }

    /// Return the route with the patch applied; blank names are rejected
    pub fn patched(&self, patch: &RoutePatch) -> Result<Self> {
        let mut updated = self.clone();
        if let Some(name) = &patch.name {
            updated.name = normalize_name(name)?;
        }
        if let Some(at) = patch.last_forecast_update {
            updated.last_forecast_update = Some(at);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, CityId, DateRange};

    fn visit(id: u64, a: u32, d: u32) -> CityVisit {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, a).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
        )
        .unwrap();
        CityVisit::new(City::new(CityId(id), format!("City {id}")), range)
    }

    #[test]
    fn test_new_derives_start_and_end() {
        let route = Route::new("Europe Trip", vec![visit(1, 1, 5), visit(2, 5, 9)]).unwrap();
        assert_eq!(route.starts_at(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(route.ends_at(), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert!(route.last_forecast_update().is_none());
    }

    #[test]
    fn test_new_validates_cities_before_name() {
        assert!(matches!(Route::new("", vec![]), Err(RoutecastError::EmptyItinerary)));
        assert!(matches!(
            Route::new("   ", vec![visit(1, 1, 2)]),
            Err(RoutecastError::InvalidName)
        ));
    }

    #[test]
    fn test_name_is_trimmed() {
        let route = Route::new("  Balkans  ", vec![visit(1, 1, 2)]).unwrap();
        assert_eq!(route.name(), "Balkans");
    }

    #[test]
    fn test_stops_are_one_indexed() {
        let route = Route::new("Trip", vec![visit(1, 1, 2), visit(2, 2, 3)]).unwrap();
        let positions: Vec<_> = route.stops().map(|(pos, v)| (pos, v.city_id)).collect();
        assert_eq!(positions, vec![(1, CityId(1)), (2, CityId(2))]);
    }

    #[test]
    fn test_patch_changes_only_mutable_fields() {
        let route = Route::new("Trip", vec![visit(1, 1, 2)]).unwrap();
        let now = Utc::now();
        let renamed = route.patched(&RoutePatch::rename("New")).unwrap();
        let refreshed = renamed.patched(&RoutePatch::forecast_updated(now)).unwrap();

        assert_eq!(refreshed.id(), route.id());
        assert_eq!(refreshed.cities(), route.cities());
        assert_eq!(refreshed.name(), "New");
        assert_eq!(refreshed.last_forecast_update(), Some(now));

        assert!(matches!(
            route.patched(&RoutePatch::rename(" ")),
            Err(RoutecastError::InvalidName)
        ));
    }

    #[test]
    fn test_stored_route_is_checked_on_read() {
        let route = Route::new("Trip", vec![visit(1, 1, 2), visit(2, 2, 6)]).unwrap();
        let stored = serde_json::to_value(&route).unwrap();

        let mut empty = stored.clone();
        empty["cities"] = serde_json::json!([]);
        assert!(serde_json::from_value::<Route>(empty).is_err());

        let mut blank = stored.clone();
        blank["name"] = serde_json::json!("  ");
        assert!(serde_json::from_value::<Route>(blank).is_err());

        let mut skewed = stored;
        skewed["starts_at"] = serde_json::json!("2030-01-01");
        skewed["ends_at"] = serde_json::json!("2020-01-01");
        let read: Route = serde_json::from_value(skewed).unwrap();
        assert_eq!(read.starts_at(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(read.ends_at(), NaiveDate::from_ymd_opt(2024, 6, 6).unwrap());
        assert_eq!(read, route);
    }

    #[test]
    fn test_route_id_round_trips_through_str() {
        let id = RouteId::new();
        let parsed: RouteId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
