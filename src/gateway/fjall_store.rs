//! Durable route persistence on a fjall keyspace
//!
//! The whole collection is stored as one postcard-encoded list under a single
//! key, which keeps save order without a separate index. Writes are
//! read-modify-write and serialized through an async mutex.

use std::path::Path;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use fjall::Keyspace;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, instrument};

use super::RoutePersistenceGateway;
use crate::models::{Route, RouteId, RoutePatch};
use crate::{Result, RoutecastError};

const ROUTES_KEY: &str = "routes";

pub struct FjallRouteGateway {
    store: Keyspace,
    write_lock: Mutex<()>,
}

fn read_routes(store: Keyspace) -> anyhow::Result<Vec<Route>> {
    match store.get(ROUTES_KEY.as_bytes().to_vec())? {
        Some(bytes) => {
            postcard::from_bytes(&bytes).context("Failed to decode stored routes")
        }
        None => Ok(Vec::new()),
    }
}

fn write_routes(store: Keyspace, routes: &[Route]) -> anyhow::Result<()> {
    let bytes = postcard::to_stdvec(routes).context("Failed to encode routes")?;
    store.insert(ROUTES_KEY.as_bytes().to_vec(), bytes)?;
    Ok(())
}

impl FjallRouteGateway {
    /// Open (or create) the route database at `path`
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open route database at {}", path.display()))?;
        let store = db.keyspace("routes", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self {
            store,
            write_lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> anyhow::Result<Vec<Route>> {
        let store = self.store.clone();
        task::spawn_blocking(move || read_routes(store)).await?
    }

    async fn save(&self, routes: Vec<Route>) -> anyhow::Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || write_routes(store, &routes)).await?
    }
}

#[async_trait]
impl RoutePersistenceGateway for FjallRouteGateway {
    #[instrument(name = "fjall_create_route", level = "debug", skip(self, route), fields(id = %route.id()))]
    async fn create(&self, route: &Route) -> Result<Route> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        if routes.iter().any(|r| r.id() == route.id()) {
            return Err(anyhow!("Route {} already stored", route.id()).into());
        }
        routes.push(route.clone());
        self.save(routes).await?;
        debug!("Route stored");
        Ok(route.clone())
    }

    async fn list(&self) -> Result<Vec<Route>> {
        Ok(self.load().await?)
    }

    #[instrument(name = "fjall_update_route", level = "debug", skip(self, patch))]
    async fn update(&self, id: RouteId, patch: &RoutePatch) -> Result<Route> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        let slot = routes
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RoutecastError::route_not_found(id))?;
        *slot = slot.patched(patch)?;
        let updated = slot.clone();
        self.save(routes).await?;
        Ok(updated)
    }

    #[instrument(name = "fjall_delete_route", level = "debug", skip(self))]
    async fn delete(&self, id: RouteId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut routes = self.load().await?;
        let before = routes.len();
        routes.retain(|r| r.id() != id);
        if routes.len() == before {
            return Err(RoutecastError::route_not_found(id));
        }
        self.save(routes).await?;
        Ok(())
    }
}
