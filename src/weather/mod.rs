//! Per-visit forecasts for itineraries and saved routes

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::cache::PersistentCache;
use crate::gateway::ForecastGateway;
use crate::itinerary::ItineraryBuilder;
use crate::models::{CityForecast, DailyForecast, ForecastQuery, Route};

pub mod open_meteo;

pub struct ForecastService {
    gateway: Arc<dyn ForecastGateway>,
    cache: Option<PersistentCache>,
    ttl: Duration,
}

impl ForecastService {
    /// Uncached service over `gateway`
    #[must_use]
    pub fn new(gateway: Arc<dyn ForecastGateway>) -> Self {
        Self {
            gateway,
            cache: None,
            ttl: Duration::ZERO,
        }
    }

    /// Keep fetched days in `cache` for `ttl`
    #[must_use]
    pub fn with_cache(mut self, cache: PersistentCache, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    /// Forecast for one visit, limited to the days of its stay
    pub async fn forecast_for(&self, query: &ForecastQuery) -> Result<CityForecast> {
        self.forecast_on(query, Utc::now().date_naive()).await
    }

    /// Forecast for one visit as seen on `today`
    #[instrument(skip(self, query), fields(city = %query.city.name, range = %query.date_range))]
    pub(crate) async fn forecast_on(
        &self,
        query: &ForecastQuery,
        today: NaiveDate,
    ) -> Result<CityForecast> {
        let key = query.cache_key(today);

        if let Some(cache) = &self.cache {
            match cache.get::<Vec<DailyForecast>>(&key).await {
                Ok(Some(days)) => {
                    debug!("Using cached forecast");
                    return Ok(CityForecast::for_query(query, days));
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Forecast cache read failed"),
            }
        }

        let days = self.gateway.fetch(query).await.inspect_err(|e| {
            warn!(error = %e, "Fetching forecast failed");
        })?;
        let forecast = CityForecast::for_query(query, days);

        // Nothing to keep yet when the stay is still beyond the horizon
        if forecast.days.is_empty() {
            return Ok(forecast);
        }
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, forecast.days.clone(), self.ttl).await {
                warn!(error = %e, "Forecast cache write failed");
            }
        }

        Ok(forecast)
    }

    /// Forecasts for every query, in order; the first failure fails the batch
    pub async fn forecast_all(&self, queries: &[ForecastQuery]) -> Result<Vec<CityForecast>> {
        try_join_all(queries.iter().map(|q| self.forecast_for(q))).await
    }

    pub async fn forecast_route(&self, route: &Route) -> Result<Vec<CityForecast>> {
        self.forecast_all(&route.forecast_queries()).await
    }

    pub async fn forecast_itinerary(&self, itinerary: &ItineraryBuilder) -> Result<Vec<CityForecast>> {
        self.forecast_all(&itinerary.forecast_queries()).await
    }
}
