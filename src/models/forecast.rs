//! Daily forecast models and display helpers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{City, CityId, CityVisit, DateRange};

/// What the forecast layer needs to know about one visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub city: City,
    pub date_range: DateRange,
}

impl From<&CityVisit> for ForecastQuery {
    fn from(visit: &CityVisit) -> Self {
        Self {
            city: visit.city(),
            date_range: visit.date_range,
        }
    }
}

impl ForecastQuery {
    /// Cache key for this city and stay as fetched on `fetched_on`.
    ///
    /// The fetch day is part of the key since the forecast horizon moves
    /// with it.
    #[must_use]
    pub fn cache_key(&self, fetched_on: NaiveDate) -> String {
        let place = match self.city.coordinates {
            Some(coords) => {
                let (lat, lon) = coords.rounded(2);
                format!("{lat:.2}:{lon:.2}")
            }
            None => format!("city-{}", self.city.id),
        };
        format!(
            "forecast:{place}:{}:{}:{fetched_on}",
            self.date_range.arrival(),
            self.date_range.departure()
        )
    }
}

/// Weather for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Daily minimum temperature in Celsius
    pub temperature_min: Option<f32>,
    /// Daily maximum temperature in Celsius
    pub temperature_max: Option<f32>,
    /// Maximum apparent temperature in Celsius
    pub feels_like_max: Option<f32>,
    /// Precipitation sum in mm
    pub precipitation: f32,
    /// Precipitation probability in percent
    pub precipitation_probability: Option<u8>,
    /// Maximum wind speed in m/s
    pub wind_speed_max: f32,
    /// Dominant wind direction in degrees
    pub wind_direction: Option<u16>,
    pub weather_code: u8,
    pub description: String,
}

impl DailyForecast {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    /// Format the temperature span with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        match (self.temperature_min, self.temperature_max) {
            (Some(min), Some(max)) => format!("{min:.1}°C – {max:.1}°C"),
            (None, Some(t)) | (Some(t), None) => format!("{t:.1}°C"),
            (None, None) => "n/a".to_string(),
        }
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        match self.wind_direction {
            Some(degrees) => format!(
                "{:.1} m/s {}",
                self.wind_speed_max,
                Self::wind_direction_to_cardinal(degrees)
            ),
            None => format!("{:.1} m/s", self.wind_speed_max),
        }
    }

    /// Rain expected: either measurable precipitation or a likely chance of it
    #[must_use]
    pub fn is_wet(&self) -> bool {
        self.precipitation >= 1.0 || self.precipitation_probability.is_some_and(|p| p >= 60)
    }
}

/// Forecast days for one visit of an itinerary or route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityForecast {
    pub city_id: CityId,
    pub city_name: String,
    pub date_range: DateRange,
    pub days: Vec<DailyForecast>,
}

impl CityForecast {
    /// Keep only the days that fall inside the visit's stay
    #[must_use]
    pub fn for_query(query: &ForecastQuery, days: Vec<DailyForecast>) -> Self {
        let days = days
            .into_iter()
            .filter(|day| query.date_range.contains(day.date))
            .collect();
        Self {
            city_id: query.city.id,
            city_name: query.city.name.clone(),
            date_range: query.date_range,
            days,
        }
    }

    /// Days of the stay the forecast does not cover yet
    #[must_use]
    pub fn missing_days(&self) -> i64 {
        self.date_range.nights() + 1 - i64::try_from(self.days.len()).unwrap_or(i64::MAX)
    }
}

/// Convert an Open-Meteo weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}
