//! Terminal rendering of the display record and chart specifications.

use std::fmt::Write as _;

use weather_dashboard_core::{
    ChartBundle, CityQuery, CurrentConditions, DisplaySurface, FetchResult, Units,
    pipeline::chart::{HumidityBarChart, TemperatureDistributionPie, TemperatureForecastChart},
};

const BAR_WIDTH: usize = 30;

/// Prints fetch progress, the current-conditions fields and the charts.
#[derive(Debug)]
pub struct TerminalSurface {
    units: Units,
    json: bool,
}

impl TerminalSurface {
    pub fn new(units: Units, json: bool) -> Self {
        Self { units, json }
    }
}

impl DisplaySurface for TerminalSurface {
    fn on_fetch_started(&mut self, city: &CityQuery) {
        eprintln!("Fetching weather data for {city}...");
    }

    fn on_fetch_result(&mut self, result: &FetchResult) {
        match result {
            FetchResult::Success(data) => {
                if !self.json {
                    println!("{}", render_fields(&data.conditions, self.units));
                }
                eprintln!("Successfully fetched data for {}", data.conditions.city);
            }
            failure => {
                if let Some(err) = failure.error() {
                    eprintln!("{}", err.status_label());
                }
            }
        }
    }

    fn on_chart_bundle(&mut self, bundle: &ChartBundle) {
        if self.json {
            match serde_json::to_string_pretty(bundle) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "failed to serialize chart bundle"),
            }
            return;
        }

        println!("{}", render_temperature_chart(&bundle.temperature, self.units));
        println!("{}", render_humidity_chart(&bundle.humidity));
        println!("{}", render_distribution_pie(&bundle.distribution, self.units));
    }
}

/// The eight labelled fields of the current-conditions panel.
pub fn display_fields(c: &CurrentConditions, units: Units) -> Vec<(&'static str, String)> {
    let deg = units.temperature_symbol();

    vec![
        ("City", c.location()),
        ("Temperature", format!("{:.1}{deg}", c.temperature)),
        ("Feels Like", format!("{:.1}{deg}", c.feels_like)),
        ("Humidity", format!("{}%", c.humidity)),
        ("Pressure", format!("{} hPa", c.pressure)),
        ("Wind Speed", format!("{} {}", c.wind_speed, units.speed_symbol())),
        ("Weather", c.category.clone()),
        ("Description", c.description.clone()),
    ]
}

pub fn render_fields(c: &CurrentConditions, units: Units) -> String {
    let mut out = String::from("Current Weather Information\n");

    for (label, value) in display_fields(c, units) {
        let _ = writeln!(out, "  {:<13}{value}", format!("{label}:"));
    }

    out
}

pub fn render_temperature_chart(chart: &TemperatureForecastChart, units: Units) -> String {
    let deg = units.temperature_symbol();
    let mut out = format!("{}\n", chart.title);

    if chart.time_labels.is_empty() {
        out.push_str("  (no forecast data)\n");
        return out;
    }

    let all = chart.temperature.values.iter().chain(&chart.feels_like.values).copied();
    let (min, max) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let _ = writeln!(
        out,
        "  {:<6}{:>9}  {:>9}  (■ {}, □ {})",
        chart.x_label,
        chart.temperature.label,
        chart.feels_like.label,
        chart.temperature.label,
        chart.feels_like.label,
    );

    let rows = chart
        .time_labels
        .iter()
        .zip(&chart.temperature.values)
        .zip(&chart.feels_like.values);

    for ((label, temp), feels) in rows {
        let _ = writeln!(
            out,
            "  {label:<6}{:>9}  {:>9}  {}",
            format!("{temp:.1}{deg}"),
            format!("{feels:.1}{deg}"),
            scale_marks(*temp, *feels, min, max),
        );
    }

    out
}

pub fn render_humidity_chart(chart: &HumidityBarChart) -> String {
    let mut out = format!("{}\n", chart.title);

    if chart.bars.is_empty() {
        out.push_str("  (no forecast data)\n");
        return out;
    }

    for bar in &chart.bars {
        let len = usize::from(bar.value.min(100)) * BAR_WIDTH / 100;
        let _ = writeln!(
            out,
            "  {:<6}{:<width$} {}",
            bar.time_label,
            "█".repeat(len),
            bar.annotation,
            width = BAR_WIDTH,
        );
    }

    out
}

pub fn render_distribution_pie(pie: &TemperatureDistributionPie, units: Units) -> String {
    let deg = units.temperature_symbol();
    let mut out = format!("{}\n", pie.title);

    let total: f64 = pie.values().iter().sum();

    for wedge in &pie.wedges {
        let share = if total != 0.0 { wedge.value / total * 100.0 } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:<12}{:>9}  {share:>5.1}% of pie",
            wedge.label,
            format!("{:.1}{deg}", wedge.value),
        );
    }

    if pie.has_negative_wedges() {
        out.push_str("  note: negative temperatures make the pie proportions meaningless\n");
    }

    out
}

/// Place ■ (temperature) and □ (feels like) on a shared horizontal scale.
fn scale_marks(temp: f64, feels: f64, min: f64, max: f64) -> String {
    let pos = |v: f64| -> usize {
        if max > min {
            (((v - min) / (max - min)) * (BAR_WIDTH - 1) as f64).round() as usize
        } else {
            0
        }
    };

    let mut cells = vec![' '; BAR_WIDTH];
    cells[pos(feels).min(BAR_WIDTH - 1)] = '□';
    cells[pos(temp).min(BAR_WIDTH - 1)] = '■';

    cells.into_iter().collect::<String>().trim_end().to_string()
}
