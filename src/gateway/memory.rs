//! Local-only route persistence kept in process memory

use std::sync::Mutex;

use async_trait::async_trait;

use super::RoutePersistenceGateway;
use crate::models::{Route, RouteId, RoutePatch};
use crate::{Result, RoutecastError};

#[derive(Debug, Default)]
pub struct InMemoryRouteGateway {
    routes: Mutex<Vec<Route>>,
}

impl InMemoryRouteGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Route>>> {
        self.routes
            .lock()
            .map_err(|_| RoutecastError::gateway("In-memory route storage is poisoned"))
    }
}

#[async_trait]
impl RoutePersistenceGateway for InMemoryRouteGateway {
    async fn create(&self, route: &Route) -> Result<Route> {
        self.lock()?.push(route.clone());
        Ok(route.clone())
    }

    async fn list(&self) -> Result<Vec<Route>> {
        Ok(self.lock()?.clone())
    }

    async fn update(&self, id: RouteId, patch: &RoutePatch) -> Result<Route> {
        let mut routes = self.lock()?;
        let slot = routes
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RoutecastError::route_not_found(id))?;
        *slot = slot.patched(patch)?;
        Ok(slot.clone())
    }

    async fn delete(&self, id: RouteId) -> Result<()> {
        let mut routes = self.lock()?;
        let index = routes
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RoutecastError::route_not_found(id))?;
        routes.remove(index);
        Ok(())
    }
}
