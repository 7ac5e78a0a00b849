use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::RoutecastError;
use crate::gateway::CitySearch;
use crate::itinerary::{Adjustment, ItineraryBuilder};
use crate::models::{
    City, CityForecast, CityId, CityVisit, Coordinates, DailyForecast, DateRange, Route, RouteId,
};
use crate::session::TripSession;
use crate::weather::ForecastService;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<TripSession>>,
    pub forecasts: Arc<ForecastService>,
    pub cities: Arc<dyn CitySearch>,
}

impl AppState {
    pub fn new(
        session: TripSession,
        forecasts: ForecastService,
        cities: Arc<dyn CitySearch>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            forecasts: Arc::new(forecasts),
            cities,
        }
    }
}

/// Library error carried to an HTTP status and a user-facing message
pub struct ApiError(RoutecastError);

impl From<RoutecastError> for ApiError {
    fn from(err: RoutecastError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            RoutecastError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RoutecastError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            err if err.is_user_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        let body = ApiErrorBody {
            error: self.0.user_message(),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize)]
pub struct ApiItinerary {
    pub cities: Vec<CityVisit>,
    /// Suggested arrival for the next city
    pub next_arrival: Option<NaiveDate>,
    pub total_distance_km: f64,
}

impl From<&ItineraryBuilder> for ApiItinerary {
    fn from(itinerary: &ItineraryBuilder) -> Self {
        Self {
            cities: itinerary.snapshot(),
            next_arrival: itinerary.last_departure(),
            total_distance_km: itinerary.total_distance_km(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct AddCityRequest {
    pub city_id: u64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl AddCityRequest {
    fn city(&self) -> City {
        let city = City::new(CityId(self.city_id), self.name.clone());
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => city.with_coordinates(Coordinates::new(lat, lon)),
            _ => city,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct AddCityResponse {
    /// Whether the requested dates were moved
    pub adjusted: bool,
    pub adjustment: Adjustment,
    pub itinerary: ApiItinerary,
}

#[derive(Serialize, Deserialize)]
pub struct ApiStop {
    pub position: usize,
    pub city_id: CityId,
    pub city_name: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub coordinates: Option<Coordinates>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiRoute {
    pub id: RouteId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    pub last_forecast_update: Option<DateTime<Utc>>,
    pub total_distance_km: f64,
    pub stops: Vec<ApiStop>,
}

impl From<&Route> for ApiRoute {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id(),
            name: route.name().to_string(),
            created_at: route.created_at(),
            starts_at: route.starts_at(),
            ends_at: route.ends_at(),
            last_forecast_update: route.last_forecast_update(),
            total_distance_km: route.total_distance_km(),
            stops: route
                .stops()
                .map(|(position, visit)| ApiStop {
                    position,
                    city_id: visit.city_id,
                    city_name: visit.city_name.clone(),
                    arrival: visit.date_range.arrival(),
                    departure: visit.date_range.departure(),
                    coordinates: visit.coordinates,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
pub struct SaveRouteRequest {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct RenameRouteRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiDailyForecast {
    #[serde(flatten)]
    pub day: DailyForecast,
    pub temperature: String,
    pub wind: String,
    pub wet: bool,
}

impl From<&DailyForecast> for ApiDailyForecast {
    fn from(day: &DailyForecast) -> Self {
        Self {
            temperature: day.format_temperature(),
            wind: day.format_wind(),
            wet: day.is_wet(),
            day: day.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiCityForecast {
    pub city_id: CityId,
    pub city_name: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    /// Days of the stay beyond the forecast horizon
    pub missing_days: i64,
    pub days: Vec<ApiDailyForecast>,
}

impl From<&CityForecast> for ApiCityForecast {
    fn from(forecast: &CityForecast) -> Self {
        Self {
            city_id: forecast.city_id,
            city_name: forecast.city_name.clone(),
            arrival: forecast.date_range.arrival(),
            departure: forecast.date_range.departure(),
            missing_days: forecast.missing_days(),
            days: forecast.days.iter().map(ApiDailyForecast::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RouteForecastResponse {
    pub route: ApiRoute,
    pub forecasts: Vec<ApiCityForecast>,
}

#[derive(Deserialize)]
pub struct CityQuery {
    #[serde(default)]
    pub q: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/itinerary", get(get_itinerary).delete(clear_itinerary))
        .route("/itinerary/cities", post(add_city))
        .route("/itinerary/cities/{city_id}", delete(remove_city))
        .route("/itinerary/forecast", get(itinerary_forecast))
        .route("/routes", get(list_routes).post(save_route))
        .route(
            "/routes/{id}",
            get(get_route).patch(rename_route).delete(delete_route),
        )
        .route("/routes/{id}/load", post(load_route))
        .route("/routes/{id}/forecast", post(update_route_forecast))
        .route("/routes/{id}/select", post(select_route))
        .route("/selected-route", get(selected_route))
        .route("/cities", get(search_cities))
        .with_state(state)
}

async fn get_itinerary(State(state): State<AppState>) -> Json<ApiItinerary> {
    let session = state.session.lock().await;
    Json(ApiItinerary::from(session.itinerary()))
}

async fn add_city(
    State(state): State<AppState>,
    Json(request): Json<AddCityRequest>,
) -> ApiResult<Json<AddCityResponse>> {
    let range = DateRange::new(request.arrival, request.departure)?;
    let mut session = state.session.lock().await;
    let adjustment = session.add_city(request.city(), range);
    Ok(Json(AddCityResponse {
        adjusted: adjustment.is_adjusted(),
        adjustment,
        itinerary: ApiItinerary::from(session.itinerary()),
    }))
}

async fn remove_city(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
) -> Json<ApiItinerary> {
    let mut session = state.session.lock().await;
    session.remove_city(CityId(city_id));
    Json(ApiItinerary::from(session.itinerary()))
}

async fn clear_itinerary(State(state): State<AppState>) -> StatusCode {
    state.session.lock().await.clear_itinerary();
    StatusCode::NO_CONTENT
}

async fn itinerary_forecast(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ApiCityForecast>>> {
    // Snapshot, then fetch without holding the session lock
    let itinerary = state.session.lock().await.itinerary().clone();
    let forecasts = state.forecasts.forecast_itinerary(&itinerary).await?;
    Ok(Json(forecasts.iter().map(ApiCityForecast::from).collect()))
}

async fn list_routes(State(state): State<AppState>) -> Json<Vec<ApiRoute>> {
    let session = state.session.lock().await;
    Json(session.routes().list().iter().map(ApiRoute::from).collect())
}

async fn save_route(
    State(state): State<AppState>,
    request: Option<Json<SaveRouteRequest>>,
) -> ApiResult<(StatusCode, Json<ApiRoute>)> {
    let Json(request) = request.unwrap_or_default();
    let mut session = state.session.lock().await;
    let route = session.save_itinerary(request.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(ApiRoute::from(&route))))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> ApiResult<Json<ApiRoute>> {
    let session = state.session.lock().await;
    Ok(Json(ApiRoute::from(session.routes().get(id)?)))
}

async fn rename_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
    Json(request): Json<RenameRouteRequest>,
) -> ApiResult<Json<ApiRoute>> {
    let mut session = state.session.lock().await;
    let route = session.rename_route(id, &request.name).await?;
    Ok(Json(ApiRoute::from(&route)))
}

async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> ApiResult<StatusCode> {
    state.session.lock().await.delete_route(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> ApiResult<Json<ApiItinerary>> {
    let mut session = state.session.lock().await;
    let itinerary = session.load_route(id)?;
    Ok(Json(ApiItinerary::from(itinerary)))
}

async fn update_route_forecast(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> ApiResult<Json<RouteForecastResponse>> {
    let route = state.session.lock().await.routes().get(id)?.clone();
    let forecasts = state.forecasts.forecast_route(&route).await?;
    let route = state
        .session
        .lock()
        .await
        .record_forecast_update(id, Utc::now())
        .await?;
    Ok(Json(RouteForecastResponse {
        route: ApiRoute::from(&route),
        forecasts: forecasts.iter().map(ApiCityForecast::from).collect(),
    }))
}

async fn select_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> ApiResult<Json<ApiRoute>> {
    let mut session = state.session.lock().await;
    Ok(Json(ApiRoute::from(session.select_route(id)?)))
}

async fn selected_route(State(state): State<AppState>) -> Json<Option<ApiRoute>> {
    let session = state.session.lock().await;
    Json(session.selected_route().map(ApiRoute::from))
}

async fn search_cities(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> ApiResult<Json<Vec<City>>> {
    Ok(Json(state.cities.search(&query.q).await?))
}
