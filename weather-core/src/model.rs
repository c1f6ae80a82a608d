use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{WeatherError, WeatherResult};

/// Maximum number of forecast points kept (about 24 hours at 3-hour steps).
pub const FORECAST_WINDOW: usize = 8;

/// A validated, trimmed, non-empty city name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityQuery(String);

impl CityQuery {
    pub fn parse(input: &str) -> WeatherResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::InvalidInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized current conditions, stored at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    pub category: String,
    pub description: String,
    pub temp_min: f64,
    pub temp_max: f64,
}

impl CurrentConditions {
    /// "name, CC" as shown in the City field.
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Parsed `dt_txt`, when it is a full date-time.
    pub timestamp: Option<NaiveDateTime>,
    pub time_label: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

/// Forecast points in source order, at most [`FORECAST_WINDOW`] long.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Keeps the first [`FORECAST_WINDOW`] points; order is never changed.
    pub fn new(mut points: Vec<ForecastPoint>) -> Self {
        points.truncate(FORECAST_WINDOW);
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn time_labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.time_label.clone()).collect()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.temperature).collect()
    }

    pub fn feels_like(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.feels_like).collect()
    }

    pub fn humidity(&self) -> Vec<u8> {
        self.points.iter().map(|p| p.humidity).collect()
    }
}

/// The two API documents exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayloads {
    pub current: Value,
    pub forecast: Value,
}

/// Everything one successful fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedWeather {
    pub conditions: CurrentConditions,
    pub forecast: ForecastSeries,
    pub payloads: RawPayloads,
}

/// Outcome of one fetch attempt.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success(Arc<FetchedWeather>),
    CityNotFound { city: String },
    AuthenticationFailure,
    NetworkFailure(String),
    UnexpectedFailure(String),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }

    /// The failure as a [`WeatherError`], or `None` on success.
    pub fn error(&self) -> Option<WeatherError> {
        self.clone().into_result().err()
    }

    pub fn into_result(self) -> WeatherResult<Arc<FetchedWeather>> {
        match self {
            FetchResult::Success(data) => Ok(data),
            FetchResult::CityNotFound { city } => Err(WeatherError::CityNotFound { city }),
            FetchResult::AuthenticationFailure => Err(WeatherError::AuthenticationFailure),
            FetchResult::NetworkFailure(detail) => Err(WeatherError::NetworkFailure(detail)),
            FetchResult::UnexpectedFailure(detail) => Err(WeatherError::UnexpectedFailure(detail)),
        }
    }
}

impl From<WeatherError> for FetchResult {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::AuthenticationFailure => FetchResult::AuthenticationFailure,
            WeatherError::CityNotFound { city } => FetchResult::CityNotFound { city },
            WeatherError::NetworkFailure(detail) => FetchResult::NetworkFailure(detail),
            WeatherError::MalformedResponse(detail) | WeatherError::UnexpectedFailure(detail) => {
                FetchResult::UnexpectedFailure(detail)
            }
            other => FetchResult::UnexpectedFailure(other.to_string()),
        }
    }
}
