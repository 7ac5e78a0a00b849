//! Collection of saved routes and their CRUD lifecycle
//!
//! Every mutation is validated locally first, then handed to the persistence
//! gateway, and only committed to the in-memory collection once the gateway
//! confirms. A gateway failure leaves the collection as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::gateway::{InMemoryRouteGateway, RoutePersistenceGateway};
use crate::models::{CityVisit, Route, RouteId, RoutePatch, route::normalize_name};
use crate::{Result, RoutecastError};

pub struct RouteStore {
    gateway: Arc<dyn RoutePersistenceGateway>,
    routes: Vec<Route>,
}

impl RouteStore {
    /// Empty store backed by `gateway`
    #[must_use]
    pub fn new(gateway: Arc<dyn RoutePersistenceGateway>) -> Self {
        Self {
            gateway,
            routes: Vec::new(),
        }
    }

    /// Local-only store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRouteGateway::new()))
    }

    /// Store hydrated with everything the gateway already holds
    pub async fn open(gateway: Arc<dyn RoutePersistenceGateway>) -> Result<Self> {
        let routes = gateway.list().await?;
        info!(count = routes.len(), "Loaded saved routes");
        Ok(Self { gateway, routes })
    }

    /// Save `cities` as a new named route
    #[instrument(skip(self, cities), fields(cities = cities.len()))]
    pub async fn save_as_new_route(&mut self, name: &str, cities: &[CityVisit]) -> Result<Route> {
        let route = Route::new(name, cities.to_vec())?;
        let stored = self.gateway.create(&route).await.inspect_err(|e| {
            warn!(error = %e, "Persisting new route failed");
        })?;

        info!(id = %stored.id(), name = stored.name(), "Route saved");
        self.routes.push(stored.clone());
        Ok(stored)
    }

    /// Replace a route's name; id and cities stay the same
    #[instrument(skip(self))]
    pub async fn rename(&mut self, id: RouteId, new_name: &str) -> Result<Route> {
        let index = self.index_of(id)?;
        let name = normalize_name(new_name)?;
        self.apply(index, RoutePatch::rename(name)).await
    }

    /// Remove a route and return what was stored
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: RouteId) -> Result<Route> {
        let index = self.index_of(id)?;
        self.gateway.delete(id).await.inspect_err(|e| {
            warn!(error = %e, "Deleting route failed");
        })?;

        info!("Route deleted");
        Ok(self.routes.remove(index))
    }

    /// Independent copy of a route's cities for a fresh itinerary
    pub fn load(&self, id: RouteId) -> Result<Vec<CityVisit>> {
        Ok(self.get(id)?.cities().to_vec())
    }

    pub fn get(&self, id: RouteId) -> Result<&Route> {
        self.routes
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| RoutecastError::route_not_found(id))
    }

    /// All routes in save order
    #[must_use]
    pub fn list(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Suggested name for the next route; not required to be unique
    #[must_use]
    pub fn default_name(&self) -> String {
        format!("Route {}", self.routes.len() + 1)
    }

    /// Stamp the time forecasts were last fetched for a route
    #[instrument(skip(self))]
    pub async fn record_forecast_update(&mut self, id: RouteId, at: DateTime<Utc>) -> Result<Route> {
        let index = self.index_of(id)?;
        self.apply(index, RoutePatch::forecast_updated(at)).await
    }

    fn index_of(&self, id: RouteId) -> Result<usize> {
        self.routes
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RoutecastError::route_not_found(id))
    }

    async fn apply(&mut self, index: usize, patch: RoutePatch) -> Result<Route> {
        let id = self.routes[index].id();
        // Validate against the local copy before touching the gateway
        self.routes[index].patched(&patch)?;

        let updated = self.gateway.update(id, &patch).await.inspect_err(|e| {
            warn!(error = %e, "Updating route failed");
        })?;
        self.routes[index] = updated.clone();
        Ok(updated)
    }
}
