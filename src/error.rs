//! Error types and handling for the routecast engine

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::RouteId;

/// Main error type for itinerary and route operations
#[derive(Error, Debug)]
pub enum RoutecastError {
    /// A stay whose departure precedes its arrival
    #[error("Invalid date range: departure {departure} is before arrival {arrival}")]
    InvalidRange {
        arrival: NaiveDate,
        departure: NaiveDate,
    },

    /// Saving an itinerary that has no cities
    #[error("Cannot save an itinerary without cities")]
    EmptyItinerary,

    /// Blank route name on save or rename
    #[error("Route name cannot be blank")]
    InvalidName,

    /// Unknown route id on rename, delete or load
    #[error("Route not found: {id}")]
    RouteNotFound { id: RouteId },

    /// Persistence, forecast or search backend failure
    #[error("Gateway error: {message}")]
    Gateway { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl RoutecastError {
    /// Create a new invalid range error
    #[must_use]
    pub fn invalid_range(arrival: NaiveDate, departure: NaiveDate) -> Self {
        Self::InvalidRange { arrival, departure }
    }

    /// Create a new route not found error
    #[must_use]
    pub fn route_not_found(id: RouteId) -> Self {
        Self::RouteNotFound { id }
    }

    /// Create a new gateway error
    pub fn gateway<S: Into<String>>(message: S) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the caller can fix this by re-prompting the user
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RoutecastError::InvalidRange { .. }
                | RoutecastError::EmptyItinerary
                | RoutecastError::InvalidName
                | RoutecastError::RouteNotFound { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RoutecastError::InvalidRange { .. } => {
                "The departure date must not be before the arrival date.".to_string()
            }
            RoutecastError::EmptyItinerary => {
                "Add at least one city before saving the route.".to_string()
            }
            RoutecastError::InvalidName => "Please enter a name for the route.".to_string(),
            RoutecastError::RouteNotFound { .. } => {
                "This route no longer exists. It may have been deleted.".to_string()
            }
            RoutecastError::Gateway { .. } => {
                "Unable to reach the storage or weather service. Please try again.".to_string()
            }
            RoutecastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            RoutecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<anyhow::Error> for RoutecastError {
    fn from(err: anyhow::Error) -> Self {
        RoutecastError::gateway(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = RoutecastError::invalid_range(date(2024, 6, 5), date(2024, 6, 1));
        assert_eq!(
            err.to_string(),
            "Invalid date range: departure 2024-06-01 is before arrival 2024-06-05"
        );

        let err = RoutecastError::gateway("connection refused");
        assert_eq!(err.to_string(), "Gateway error: connection refused");
    }

    #[test]
    fn test_user_errors_are_recoverable() {
        assert!(RoutecastError::EmptyItinerary.is_user_error());
        assert!(RoutecastError::InvalidName.is_user_error());
        assert!(RoutecastError::route_not_found(RouteId::new()).is_user_error());
        assert!(!RoutecastError::gateway("down").is_user_error());
    }

    #[test]
    fn test_user_messages() {
        assert!(
            RoutecastError::EmptyItinerary
                .user_message()
                .contains("at least one city")
        );
        assert!(RoutecastError::gateway("x").user_message().contains("Unable to reach"));
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err = anyhow::anyhow!("disk full").context("Failed to persist routes");
        let converted: RoutecastError = err.into();
        assert!(matches!(converted, RoutecastError::Gateway { .. }));
        assert!(converted.to_string().contains("disk full"));
        assert!(converted.to_string().contains("Failed to persist routes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoutecastError = io_err.into();
        assert!(matches!(err, RoutecastError::Io { .. }));
    }
}
