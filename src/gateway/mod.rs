//! Narrow contracts to the engine's external collaborators
//!
//! - Route persistence: durable storage for saved routes
//! - Forecast: daily weather for one city over a stay
//! - City search: resolving a search term into cities
//!
//! Every call completes with a single `Result`; the engine never retries.

use async_trait::async_trait;

use crate::Result;
use crate::models::{City, DailyForecast, ForecastQuery, Route, RouteId, RoutePatch};

pub mod catalog;
pub mod fjall_store;
pub mod memory;

pub use catalog::CityCatalog;
pub use fjall_store::FjallRouteGateway;
pub use memory::InMemoryRouteGateway;

/// Storage backend for saved routes
#[async_trait]
pub trait RoutePersistenceGateway: Send + Sync {
    /// Persist a new route and return the stored version
    async fn create(&self, route: &Route) -> Result<Route>;

    /// All stored routes in save order
    async fn list(&self) -> Result<Vec<Route>>;

    /// Apply a patch to a stored route
    ///
    /// # Errors
    ///
    /// - `RouteNotFound` if the id is unknown to the backend
    async fn update(&self, id: RouteId, patch: &RoutePatch) -> Result<Route>;

    /// Remove a stored route
    ///
    /// # Errors
    ///
    /// - `RouteNotFound` if the id is unknown to the backend
    async fn delete(&self, id: RouteId) -> Result<()>;
}

/// Source of daily weather forecasts
#[async_trait]
pub trait ForecastGateway: Send + Sync {
    async fn fetch(&self, query: &ForecastQuery) -> Result<Vec<DailyForecast>>;
}

/// City lookup by free-text term
#[async_trait]
pub trait CitySearch: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<City>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateways_are_object_safe() {
        fn _persistence(_gateway: &dyn RoutePersistenceGateway) {}
        fn _forecast(_gateway: &dyn ForecastGateway) {}
        fn _search(_gateway: &dyn CitySearch) {}
    }
}
