//! Data models for the routecast engine
//!
//! This module contains the core domain models organized by concern:
//! - DateRange: a validated stay between arrival and departure
//! - City: resolved cities, coordinates and city visits
//! - Route: persisted, named itinerary snapshots
//! - Forecast: daily weather forecasts for a visit

pub mod city;
pub mod date_range;
pub mod forecast;
pub mod route;

// Re-export all public types for convenient access
pub use city::{City, CityId, CityVisit, Coordinates};
pub use date_range::DateRange;
pub use forecast::{CityForecast, DailyForecast, ForecastQuery};
pub use route::{Route, RouteId, RoutePatch};
