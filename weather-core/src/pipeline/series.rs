use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{WeatherError, WeatherResult},
    model::{FORECAST_WINDOW, ForecastPoint, ForecastSeries},
};

const DT_TXT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwForecastMain,
    dt_txt: String,
}

/// Extract the first [`FORECAST_WINDOW`] entries of `list`, in source order.
pub fn build_series(forecast: &Value) -> WeatherResult<ForecastSeries> {
    let list = forecast.get("list").and_then(Value::as_array).ok_or_else(|| {
        WeatherError::MalformedResponse("forecast: missing `list` of entries".into())
    })?;

    let points = list
        .iter()
        .take(FORECAST_WINDOW)
        .enumerate()
        .map(|(idx, entry)| to_point(idx, entry))
        .collect::<WeatherResult<Vec<_>>>()?;

    Ok(ForecastSeries::new(points))
}

fn to_point(idx: usize, entry: &Value) -> WeatherResult<ForecastPoint> {
    let parsed = OwForecastEntry::deserialize(entry)
        .map_err(|e| WeatherError::MalformedResponse(format!("forecast entry {idx}: {e}")))?;

    let time_label = time_label(&parsed.dt_txt).ok_or_else(|| {
        WeatherError::MalformedResponse(format!(
            "forecast entry {idx}: `dt_txt` has no time of day: {:?}",
            parsed.dt_txt
        ))
    })?;

    let timestamp = parse_dt_txt(&parsed.dt_txt);
    if timestamp.is_none() {
        tracing::debug!(
            entry = idx,
            dt_txt = %parsed.dt_txt,
            "forecast time is not a full date-time"
        );
    }

    Ok(ForecastPoint {
        timestamp,
        time_label,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity: parsed.main.humidity,
    })
}

/// Best-effort parse; the label never depends on it.
fn parse_dt_txt(dt_txt: &str) -> Option<NaiveDateTime> {
    DT_TXT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(dt_txt.trim(), fmt).ok())
}

/// "2024-03-01 15:00:00" -> "15:00". Plain truncation, no timezone handling.
pub fn time_label(dt_txt: &str) -> Option<String> {
    let time = dt_txt.split_whitespace().nth(1)?;
    Some(time.chars().take(5).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::forecast_json;
    use serde_json::json;

    fn entry(temp: f64, humidity: u8, dt_txt: &str) -> Value {
        json!({
            "main": { "temp": temp, "feels_like": temp, "humidity": humidity },
            "dt_txt": dt_txt,
        })
    }

    fn forecast(n: usize) -> Value {
        serde_json::from_str(&forecast_json(n)).expect("fixture is valid JSON")
    }

    #[test]
    fn length_is_min_of_window_and_list() {
        for n in [0, 1, 5, 8, 9, 40] {
            let series = build_series(&forecast(n)).expect("well-formed forecast");
            assert_eq!(series.len(), n.min(FORECAST_WINDOW), "list of {n}");
        }
    }

    #[test]
    fn labels_follow_source_order_within_a_day() {
        let series = build_series(&forecast(8)).expect("well-formed forecast");

        let labels = series.time_labels();
        assert_eq!(
            labels,
            ["00:00", "03:00", "06:00", "09:00", "12:00", "15:00", "18:00", "21:00"]
        );
        assert!(labels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn points_carry_entry_values_unchanged() {
        let series = build_series(&forecast(3)).expect("well-formed forecast");
        let p = &series.points()[2];

        assert_eq!(p.temperature, 11.0);
        assert_eq!(p.feels_like, 9.5);
        assert_eq!(p.humidity, 62);
        assert_eq!(series.humidity(), [60, 61, 62]);
        let ts = p.timestamp.expect("full date-time parses");
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2024-03-01 06:00");
    }

    #[test]
    fn out_of_order_source_is_not_resorted() {
        let doc = json!({ "list": [
            entry(1.0, 10, "2024-03-01 12:00:00"),
            entry(2.0, 20, "2024-03-01 06:00:00"),
            entry(3.0, 30, "2024-03-01 06:00:00"),
        ]});

        let series = build_series(&doc).expect("well-formed forecast");
        assert_eq!(series.time_labels(), ["12:00", "06:00", "06:00"]);
        assert_eq!(series.temperatures(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn entries_past_the_window_are_not_inspected() {
        let mut doc = forecast(8);
        doc["list"]
            .as_array_mut()
            .expect("array")
            .push(json!({ "garbage": true }));

        assert_eq!(build_series(&doc).expect("ninth entry ignored").len(), 8);
    }

    #[test]
    fn missing_list_is_malformed() {
        for doc in [json!({ "cod": "200" }), json!({ "list": "nope" })] {
            let err = build_series(&doc).unwrap_err();
            assert!(matches!(err, WeatherError::MalformedResponse(ref m) if m.contains("list")));
        }
    }

    #[test]
    fn entry_without_time_of_day_is_malformed() {
        let doc = json!({ "list": [entry(1.0, 10, "2024-03-01")] });

        let err = build_series(&doc).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(ref m) if m.contains("entry 0")));
    }

    #[test]
    fn date_time_without_seconds_is_accepted() {
        let doc = json!({ "list": [
            entry(4.0, 40, "2024-03-01 09:30"),
            entry(5.0, 50, "2024-03-01 9:45"),
        ]});

        let series = build_series(&doc).expect("labels are derivable");
        assert_eq!(series.time_labels(), ["09:30", "9:45"]);

        let first = series.points()[0].timestamp.expect("minute resolution parses");
        assert_eq!(first.format("%H:%M:%S").to_string(), "09:30:00");
    }

    #[test]
    fn unparseable_time_still_yields_label() {
        let doc = json!({ "list": [entry(4.0, 40, "2024-03-01 noon-ish")] });

        let series = build_series(&doc).expect("label is a plain truncation");
        assert_eq!(series.time_labels(), ["noon-"]);
        assert_eq!(series.points()[0].timestamp, None);
    }

    #[test]
    fn time_label_truncates_to_five_chars() {
        assert_eq!(time_label("2024-03-01 09:30:00").as_deref(), Some("09:30"));
        assert_eq!(time_label("2024-03-01 9:30").as_deref(), Some("9:30"));
        assert_eq!(time_label("2024-03-01"), None);
    }
}
