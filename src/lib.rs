//! `routecast` - multi-city itinerary planning
//!
//! Builds an ordered itinerary of city stays, saves it as named routes and
//! fetches per-city daily forecasts for the days of each stay.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod itinerary;
pub mod models;
pub mod route_store;
pub mod session;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::RoutecastConfig;
pub use error::RoutecastError;
pub use gateway::{
    CityCatalog, CitySearch, FjallRouteGateway, ForecastGateway, InMemoryRouteGateway,
    RoutePersistenceGateway,
};
pub use itinerary::{Adjustment, ItineraryBuilder};
pub use models::{
    City, CityForecast, CityId, CityVisit, Coordinates, DailyForecast, DateRange, ForecastQuery,
    Route, RouteId, RoutePatch,
};
pub use route_store::RouteStore;
pub use session::TripSession;
pub use weather::ForecastService;
pub use weather::open_meteo::OpenMeteoClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RoutecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
