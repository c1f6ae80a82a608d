//! Chart specifications derived from one fetch.
//!
//! Every chart is a plain value computed from [`CurrentConditions`] and
//! [`ForecastSeries`]; there is no incremental update, the whole bundle is
//! rebuilt on each successful fetch.

use serde::Serialize;

use crate::{
    config::Units,
    model::{CurrentConditions, ForecastSeries},
};

pub const TEMPERATURE_COLOR: &str = "#FF5722";
pub const FEELS_LIKE_COLOR: &str = "#2196F3";
pub const HUMIDITY_COLOR: &str = "#4CAF50";
pub const MIN_TEMP_COLOR: &str = "#4CAF50";
pub const MAX_TEMP_COLOR: &str = "#FFC107";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: &'static str,
    pub color: &'static str,
    pub style: LineStyle,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureForecastChart {
    pub title: &'static str,
    pub x_label: &'static str,
    /// e.g. "Temperature (°C)".
    pub y_label: String,
    pub time_labels: Vec<String>,
    pub temperature: LineSeries,
    pub feels_like: LineSeries,
}

impl TemperatureForecastChart {
    pub fn series(&self) -> [&LineSeries; 2] {
        [&self.temperature, &self.feels_like]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub time_label: String,
    pub value: u8,
    /// Text drawn above the bar, e.g. "81%".
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumidityBarChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub color: &'static str,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    pub label: &'static str,
    pub color: &'static str,
    /// Raw temperature, not a share of a whole.
    pub value: f64,
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureDistributionPie {
    pub title: &'static str,
    pub wedges: [Wedge; 4],
}

impl TemperatureDistributionPie {
    /// A negative wedge cannot be drawn as a pie slice.
    pub fn has_negative_wedges(&self) -> bool {
        self.wedges.iter().any(|w| w.value < 0.0)
    }

    pub fn values(&self) -> [f64; 4] {
        [
            self.wedges[0].value,
            self.wedges[1].value,
            self.wedges[2].value,
            self.wedges[3].value,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBundle {
    pub temperature: TemperatureForecastChart,
    pub humidity: HumidityBarChart,
    pub distribution: TemperatureDistributionPie,
}

pub fn compose(
    conditions: &CurrentConditions,
    series: &ForecastSeries,
    units: Units,
) -> ChartBundle {
    let distribution = distribution_pie(conditions);
    if distribution.has_negative_wedges() {
        tracing::warn!(
            city = %conditions.city,
            values = ?distribution.values(),
            "temperature distribution has negative wedges; pie proportions are not meaningful"
        );
    }

    ChartBundle {
        temperature: temperature_chart(series, units),
        humidity: humidity_chart(series),
        distribution,
    }
}

fn temperature_chart(series: &ForecastSeries, units: Units) -> TemperatureForecastChart {
    TemperatureForecastChart {
        title: "24-Hour Temperature Forecast",
        x_label: "Time",
        y_label: format!("Temperature ({})", units.temperature_symbol()),
        time_labels: series.time_labels(),
        temperature: LineSeries {
            label: "Temperature",
            color: TEMPERATURE_COLOR,
            style: LineStyle::Solid,
            values: series.temperatures(),
        },
        feels_like: LineSeries {
            label: "Feels Like",
            color: FEELS_LIKE_COLOR,
            style: LineStyle::Dashed,
            values: series.feels_like(),
        },
    }
}

fn humidity_chart(series: &ForecastSeries) -> HumidityBarChart {
    let bars = series
        .points()
        .iter()
        .map(|p| Bar {
            time_label: p.time_label.clone(),
            value: p.humidity,
            annotation: format!("{}%", p.humidity),
        })
        .collect();

    HumidityBarChart {
        title: "Humidity Levels",
        x_label: "Time",
        y_label: "Humidity (%)",
        color: HUMIDITY_COLOR,
        bars,
    }
}

fn distribution_pie(c: &CurrentConditions) -> TemperatureDistributionPie {
    let wedge = |label: &'static str, color: &'static str, value: f64| Wedge {
        label,
        color,
        value,
        annotation: format!("{value:.1}°"),
    };

    TemperatureDistributionPie {
        title: "Temperature Distribution",
        wedges: [
            wedge("Temperature", TEMPERATURE_COLOR, c.temperature),
            wedge("Feels Like", FEELS_LIKE_COLOR, c.feels_like),
            wedge("Min Temp", MIN_TEMP_COLOR, c.temp_min),
            wedge("Max Temp", MAX_TEMP_COLOR, c.temp_max),
        ],
    }
}
