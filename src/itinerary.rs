//! In-progress itinerary and its chronological consistency rule
//!
//! Visits are kept in insertion order. Adding a city repairs only the boundary
//! with the visit immediately before it: an arrival earlier than the previous
//! departure is moved forward to that departure, and the departure follows if
//! it would otherwise end before the stay begins. Nothing else is validated
//! and removal never re-tightens the remaining dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{City, CityId, CityVisit, DateRange, ForecastQuery, city};

/// How `add_city` changed the proposed stay, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    Unchanged,
    /// Only the arrival moved forward
    ArrivalClamped { requested: DateRange, applied: DateRange },
    /// Arrival and departure both moved forward
    StayClamped { requested: DateRange, applied: DateRange },
}

impl Adjustment {
    #[must_use]
    pub fn is_adjusted(&self) -> bool {
        !matches!(self, Adjustment::Unchanged)
    }
}

/// The itinerary currently being edited
#[derive(Debug, Clone, Default)]
pub struct ItineraryBuilder {
    visits: Vec<CityVisit>,
}

impl ItineraryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-hydrate from a stored sequence without re-clamping it
    #[must_use]
    pub fn from_visits(visits: Vec<CityVisit>) -> Self {
        Self { visits }
    }

    /// Append a city, clamping its stay against the previous departure
    pub fn add_city(&mut self, city: City, proposed: DateRange) -> Adjustment {
        let (applied, adjustment) = match self.last_departure() {
            Some(previous) if proposed.arrival() < previous => {
                let applied = proposed.clamp_forward(previous);
                let adjustment = if applied.departure() == proposed.departure() {
                    Adjustment::ArrivalClamped {
                        requested: proposed,
                        applied,
                    }
                } else {
                    Adjustment::StayClamped {
                        requested: proposed,
                        applied,
                    }
                };
                debug!(
                    city = %city.name,
                    requested = %proposed,
                    applied = %applied,
                    "Clamped stay to previous departure"
                );
                (applied, adjustment)
            }
            _ => (proposed, Adjustment::Unchanged),
        };

        self.visits.push(CityVisit::new(city, applied));
        adjustment
    }

    /// Remove the first visit of `city_id`; the rest is left untouched
    pub fn remove_city(&mut self, city_id: CityId) -> Option<CityVisit> {
        let index = self.visits.iter().position(|v| v.city_id == city_id)?;
        Some(self.visits.remove(index))
    }

    #[must_use]
    pub fn current_sequence(&self) -> &[CityVisit] {
        &self.visits
    }

    pub fn clear(&mut self) {
        self.visits.clear();
    }

    /// Replace the whole sequence, e.g. when a saved route is loaded
    pub fn replace(&mut self, visits: Vec<CityVisit>) {
        self.visits = visits;
    }

    /// Departure of the last visit, the earliest sensible next arrival
    #[must_use]
    pub fn last_departure(&self) -> Option<NaiveDate> {
        self.visits.last().map(|v| v.date_range.departure())
    }

    /// Owned copy of the sequence for saving
    #[must_use]
    pub fn snapshot(&self) -> Vec<CityVisit> {
        self.visits.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        city::total_distance_km(&self.visits)
    }

    #[must_use]
    pub fn forecast_queries(&self) -> Vec<ForecastQuery> {
        self.visits.iter().map(ForecastQuery::from).collect()
    }
}
