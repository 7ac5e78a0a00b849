//! Open-Meteo integration: daily forecasts and city geocoding
//!
//! No API key is needed. Transient HTTP failures are retried with
//! exponential backoff inside the client; callers see one final result.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::gateway::{CitySearch, ForecastGateway};
use crate::models::forecast::weather_code_to_description;
use crate::models::{City, CityId, Coordinates, DailyForecast, DateRange, ForecastQuery};

/// Open-Meteo serves at most this many forecast days, today included
pub const FORECAST_HORIZON_DAYS: u64 = 16;

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,apparent_temperature_max,precipitation_sum,precipitation_probability_max,windspeed_10m_max,winddirection_10m_dominant";

pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("routecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            forecast_url: config.base_url.trim_end_matches('/').to_string(),
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Open-Meteo request URL: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Open-Meteo request failed")?
            .error_for_status()
            .context("Open-Meteo returned an error status")?;
        response
            .json()
            .await
            .context("Failed to parse Open-Meteo response")
    }

    /// Resolve a city name into candidate cities
    #[instrument(skip(self))]
    pub async fn geocode(&self, name: &str) -> Result<Vec<City>> {
        let url = format!(
            "{}/search?name={}&count=10&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name)
        );
        let response: GeocodingResponse = self.get_json(&url).await?;
        let cities: Vec<City> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(City::from)
            .collect();

        if cities.is_empty() {
            warn!("No results found for location '{}'", name);
        } else {
            info!("Found {} geocoding results for '{}'", cities.len(), name);
        }
        Ok(cities)
    }

    /// Daily forecast for a stay, trimmed to what Open-Meteo can serve
    #[instrument(skip(self))]
    pub async fn daily_forecast(
        &self,
        coordinates: Coordinates,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<Vec<DailyForecast>> {
        let Some((start, end)) = forecast_window(range, today) else {
            debug!("Stay lies outside the forecast horizon");
            return Ok(Vec::new());
        };

        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily={DAILY_FIELDS}&timezone=auto&wind_speed_unit=ms&start_date={start}&end_date={end}",
            self.forecast_url, coordinates.latitude, coordinates.longitude
        );
        let response: ForecastResponse = self.get_json(&url).await?;
        let daily = response
            .daily
            .ok_or_else(|| anyhow!("Open-Meteo response has no daily data"))?;
        Ok(daily.into_forecasts())
    }

    async fn resolve(&self, city: &City) -> Result<Coordinates> {
        if let Some(coordinates) = city.coordinates {
            return Ok(coordinates);
        }
        self.geocode(&city.name)
            .await?
            .into_iter()
            .find_map(|c| c.coordinates)
            .ok_or_else(|| anyhow!("Location not found: {}", city.name))
    }
}

#[async_trait]
impl ForecastGateway for OpenMeteoClient {
    async fn fetch(&self, query: &ForecastQuery) -> crate::Result<Vec<DailyForecast>> {
        let coordinates = self.resolve(&query.city).await?;
        let today = Utc::now().date_naive();
        Ok(self
            .daily_forecast(coordinates, query.date_range, today)
            .await?)
    }
}

#[async_trait]
impl CitySearch for OpenMeteoClient {
    async fn search(&self, term: &str) -> crate::Result<Vec<City>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.geocode(term).await?)
    }
}

/// Part of `range` inside `[today, today + horizon)`, if any
#[must_use]
pub fn forecast_window(range: DateRange, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let last_day = today.checked_add_days(Days::new(FORECAST_HORIZON_DAYS - 1))?;
    let start = range.arrival().max(today);
    let end = range.departure().min(last_day);
    (start <= end).then_some((start, end))
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyData>,
}

/// Daily weather data from Open-Meteo, one entry per day in `time`
#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<NaiveDate>,
    #[serde(rename = "weathercode", default)]
    weather_code: Vec<Option<u8>>,
    #[serde(rename = "temperature_2m_max", default)]
    temperature_max: Vec<Option<f32>>,
    #[serde(rename = "temperature_2m_min", default)]
    temperature_min: Vec<Option<f32>>,
    #[serde(rename = "apparent_temperature_max", default)]
    feels_like_max: Vec<Option<f32>>,
    #[serde(rename = "precipitation_sum", default)]
    precipitation: Vec<Option<f32>>,
    #[serde(rename = "precipitation_probability_max", default)]
    precipitation_probability: Vec<Option<u8>>,
    #[serde(rename = "windspeed_10m_max", default)]
    wind_speed_max: Vec<Option<f32>>,
    #[serde(rename = "winddirection_10m_dominant", default)]
    wind_direction: Vec<Option<u16>>,
}

fn at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

impl DailyData {
    fn into_forecasts(self) -> Vec<DailyForecast> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let weather_code = at(&self.weather_code, i).unwrap_or(0);
                DailyForecast {
                    date: *date,
                    temperature_min: at(&self.temperature_min, i),
                    temperature_max: at(&self.temperature_max, i),
                    feels_like_max: at(&self.feels_like_max, i),
                    precipitation: at(&self.precipitation, i).unwrap_or(0.0),
                    precipitation_probability: at(&self.precipitation_probability, i),
                    wind_speed_max: at(&self.wind_speed_max, i).unwrap_or(0.0),
                    wind_direction: at(&self.wind_direction, i),
                    weather_code,
                    description: weather_code_to_description(weather_code).to_string(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    id: u64,
    name: String,
    latitude: f64,
    longitude: f64,
}

impl From<GeocodingResult> for City {
    fn from(result: GeocodingResult) -> Self {
        City::new(CityId(result.id), result.name)
            .with_coordinates(Coordinates::new(result.latitude, result.longitude))
    }
}
