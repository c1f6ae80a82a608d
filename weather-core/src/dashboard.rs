use chrono::NaiveDateTime;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tokio::sync::Mutex;

use crate::{
    client::WeatherClient,
    config::Units,
    error::{WeatherError, WeatherResult},
    export::export_snapshot,
    model::{CityQuery, FetchResult, FetchedWeather},
    pipeline::{ChartBundle, compose},
};

/// Receives everything the dashboard produces.
pub trait DisplaySurface {
    fn on_fetch_started(&mut self, city: &CityQuery);
    fn on_fetch_result(&mut self, result: &FetchResult);
    fn on_chart_bundle(&mut self, bundle: &ChartBundle);
}

/// Owns the latest successful fetch and runs at most one fetch at a time.
#[derive(Debug)]
pub struct Dashboard {
    client: WeatherClient,
    current: RwLock<Option<Arc<FetchedWeather>>>,
    fetch_lock: Mutex<()>,
}

impl Dashboard {
    pub fn new(client: WeatherClient) -> Self {
        Self { client, current: RwLock::new(None), fetch_lock: Mutex::new(()) }
    }

    pub fn units(&self) -> Units {
        self.client.units()
    }

    /// Latest successful fetch, if any.
    pub fn current(&self) -> Option<Arc<FetchedWeather>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Fetch `city`, publish the result, and on success replace the current
    /// data and emit a fresh chart bundle.
    ///
    /// A second call made while one is running waits for it to finish.
    pub async fn trigger_fetch(
        &self,
        city: &str,
        surface: &mut dyn DisplaySurface,
    ) -> WeatherResult<ChartBundle> {
        let city = CityQuery::parse(city)?;

        let _guard = self.fetch_lock.lock().await;
        surface.on_fetch_started(&city);

        let result = self.client.fetch(&city).await;
        surface.on_fetch_result(&result);

        let data = result.into_result()?;
        let bundle = compose(&data.conditions, &data.forecast, self.units());

        *self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(data);
        surface.on_chart_bundle(&bundle);

        Ok(bundle)
    }

    /// Save the raw payloads of the latest fetch into `dir`.
    pub fn trigger_export(&self, dir: &Path, now: NaiveDateTime) -> WeatherResult<PathBuf> {
        let current = self.current();
        export_snapshot(dir, current.as_ref().map(|d| &d.payloads), now)
    }

    /// Chart bundle for the latest fetch, recomputed from scratch.
    pub fn charts(&self) -> WeatherResult<ChartBundle> {
        let data = self.current().ok_or(WeatherError::NoDataAvailable)?;
        Ok(compose(&data.conditions, &data.forecast, self.units()))
    }
}
