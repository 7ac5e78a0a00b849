//! One user's planning session: the itinerary being edited plus saved routes

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::Result;
use crate::itinerary::{Adjustment, ItineraryBuilder};
use crate::models::{City, CityForecast, CityId, CityVisit, DateRange, Route, RouteId};
use crate::route_store::RouteStore;
use crate::weather::ForecastService;

pub struct TripSession {
    itinerary: ItineraryBuilder,
    routes: RouteStore,
    selected: Option<RouteId>,
}

impl TripSession {
    #[must_use]
    pub fn new(routes: RouteStore) -> Self {
        Self {
            itinerary: ItineraryBuilder::new(),
            routes,
            selected: None,
        }
    }

    #[must_use]
    pub fn itinerary(&self) -> &ItineraryBuilder {
        &self.itinerary
    }

    #[must_use]
    pub fn routes(&self) -> &RouteStore {
        &self.routes
    }

    pub fn add_city(&mut self, city: City, proposed: DateRange) -> Adjustment {
        self.itinerary.add_city(city, proposed)
    }

    pub fn remove_city(&mut self, city_id: CityId) -> Option<CityVisit> {
        self.itinerary.remove_city(city_id)
    }

    pub fn clear_itinerary(&mut self) {
        self.itinerary.clear();
    }

    /// Save the current itinerary as a route and start a fresh one.
    ///
    /// Without a name the store's next default name is used. The itinerary is
    /// kept when saving fails.
    #[instrument(skip(self))]
    pub async fn save_itinerary(&mut self, name: Option<&str>) -> Result<Route> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.routes.default_name(),
        };
        let route = self
            .routes
            .save_as_new_route(&name, self.itinerary.current_sequence())
            .await?;
        self.itinerary.clear();
        Ok(route)
    }

    /// Replace the itinerary with a copy of a saved route's cities
    pub fn load_route(&mut self, id: RouteId) -> Result<&ItineraryBuilder> {
        let visits = self.routes.load(id)?;
        self.itinerary.replace(visits);
        info!(%id, "Route loaded into itinerary");
        Ok(&self.itinerary)
    }

    pub async fn rename_route(&mut self, id: RouteId, name: &str) -> Result<Route> {
        self.routes.rename(id, name).await
    }

    pub async fn delete_route(&mut self, id: RouteId) -> Result<Route> {
        let removed = self.routes.delete(id).await?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(removed)
    }

    pub fn select_route(&mut self, id: RouteId) -> Result<&Route> {
        let route = self.routes.get(id)?;
        self.selected = Some(id);
        Ok(route)
    }

    /// The selected route as currently stored
    #[must_use]
    pub fn selected_route(&self) -> Option<&Route> {
        self.selected.and_then(|id| self.routes.get(id).ok())
    }

    /// Fetch forecasts for every stop of a route and stamp the route when all
    /// of them arrived.
    ///
    /// Callers sharing the session behind a lock can fetch on their own and
    /// only lock for [`TripSession::record_forecast_update`].
    #[instrument(skip(self, forecasts))]
    pub async fn update_forecast(
        &mut self,
        id: RouteId,
        forecasts: &ForecastService,
    ) -> Result<(Route, Vec<CityForecast>)> {
        let route = self.routes.get(id)?.clone();
        let fetched = forecasts.forecast_route(&route).await?;
        let route = self.record_forecast_update(id, Utc::now()).await?;
        Ok((route, fetched))
    }

    /// Stamp a route after all of its forecasts were fetched at `at`
    pub async fn record_forecast_update(&mut self, id: RouteId, at: DateTime<Utc>) -> Result<Route> {
        let route = self.routes.record_forecast_update(id, at).await?;
        info!(%id, "Route forecast updated");
        Ok(route)
    }
}
