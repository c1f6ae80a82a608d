//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather client and its HTTP transport seam
//! - Normalization of API payloads into a display record and forecast series
//! - Chart specifications derived from a fetch
//! - Snapshot export of the raw payloads
//! - The `Dashboard`, which owns the latest fetch and feeds a `DisplaySurface`
//!
//! It is used by `weather-dashboard`, but any front-end can implement
//! [`DisplaySurface`] and drive a [`Dashboard`].

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod http;
pub mod model;
pub mod pipeline;

pub use client::{ApiSettings, WeatherClient};
pub use config::{Config, Units};
pub use dashboard::{Dashboard, DisplaySurface};
pub use error::{WeatherError, WeatherResult};
pub use export::{SnapshotRecord, export_snapshot};
pub use model::{
    CityQuery, CurrentConditions, FetchResult, FetchedWeather, ForecastPoint, ForecastSeries,
    RawPayloads,
};
pub use pipeline::{ChartBundle, build_series, compose, normalize};
