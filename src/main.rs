use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use routecast::config::expand_home;
use routecast::{
    CityCatalog, CitySearch, FjallRouteGateway, ForecastService, InMemoryRouteGateway,
    OpenMeteoClient, PersistentCache, RoutePersistenceGateway, RouteStore, RoutecastConfig,
    TripSession, api::AppState, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = RoutecastConfig::load_from_path(config_path)?;
    telemetry::init(&config.logging)?;

    info!("Starting routecast {}", routecast::VERSION);

    let gateway: Arc<dyn RoutePersistenceGateway> = match config.storage.backend.as_str() {
        "fjall" => {
            let path = expand_home(&config.storage.path);
            info!("Storing routes in {}", path.display());
            Arc::new(FjallRouteGateway::open(&path)?)
        }
        _ => {
            warn!("Using in-memory route storage; routes are lost on exit");
            Arc::new(InMemoryRouteGateway::new())
        }
    };
    let routes = RouteStore::open(gateway)
        .await
        .context("Failed to load saved routes")?;

    let open_meteo = Arc::new(OpenMeteoClient::new(&config.weather)?);
    let mut forecasts = ForecastService::new(open_meteo.clone());
    if config.cache.enabled() {
        let location = expand_home(&config.cache.location);
        let cache = PersistentCache::open(&location)
            .with_context(|| format!("Failed to open cache at {}", location.display()))?;
        forecasts = forecasts.with_cache(cache, config.cache.ttl());
    }

    let cities: Arc<dyn CitySearch> = match config.search.backend.as_str() {
        "catalog" => {
            info!("Searching {} configured cities", config.search.cities.len());
            Arc::new(CityCatalog::new(config.search.cities))
        }
        _ => open_meteo,
    };

    let state = AppState::new(TripSession::new(routes), forecasts, cities);
    web::run(&config.server, state).await
}
