use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{WeatherError, WeatherResult},
    model::CurrentConditions,
};

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

/// Map a current-conditions document onto the display record.
pub fn normalize(current: &Value) -> WeatherResult<CurrentConditions> {
    let parsed = OwCurrentResponse::deserialize(current)
        .map_err(|e| WeatherError::MalformedResponse(format!("current conditions: {e}")))?;

    let weather = parsed.weather.into_iter().next().ok_or_else(|| {
        WeatherError::MalformedResponse("current conditions: `weather` array is empty".into())
    })?;

    Ok(CurrentConditions {
        city: parsed.name,
        country: parsed.sys.country,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity: parsed.main.humidity,
        pressure: parsed.main.pressure,
        wind_speed: parsed.wind.speed,
        category: weather.main,
        description: title_case(&weather.description),
        temp_min: parsed.main.temp_min,
        temp_max: parsed.main.temp_max,
    })
}

/// Uppercase every letter that follows a non-letter, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::current_value;
    use serde_json::json;

    #[test]
    fn normalizes_full_precision_record() {
        let record = normalize(&current_value()).expect("fixture is complete");

        assert_eq!(record.city, "London");
        assert_eq!(record.country, "GB");
        assert_eq!(record.temperature, 12.34);
        assert_eq!(record.feels_like, 10.96);
        assert_eq!(record.humidity, 81);
        assert_eq!(record.pressure, 1012);
        assert_eq!(record.wind_speed, 4.63);
        assert_eq!(record.temp_min, 11.05);
        assert_eq!(record.temp_max, 13.87);
        assert_eq!(record.location(), "London, GB");
    }

    #[test]
    fn takes_first_weather_entry() {
        let record = normalize(&current_value()).expect("fixture is complete");

        assert_eq!(record.category, "Clouds");
        assert_eq!(record.description, "Broken Clouds");
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("THUNDERSTORM with heavy RAIN"), "Thunderstorm With Heavy Rain");
        assert_eq!(title_case("few clouds: 11-25%"), "Few Clouds: 11-25%");
        assert_eq!(title_case("o'clock"), "O'Clock");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn missing_required_blocks_are_malformed() {
        for field in ["name", "sys", "main", "weather", "wind"] {
            let mut doc = current_value();
            doc.as_object_mut().expect("object").remove(field);

            let err = normalize(&doc).unwrap_err();
            assert!(
                matches!(err, WeatherError::MalformedResponse(ref m) if m.contains(field)),
                "removing `{field}` gave {err:?}"
            );
        }
    }

    #[test]
    fn empty_weather_array_is_malformed() {
        let mut doc = current_value();
        doc["weather"] = json!([]);

        let err = normalize(&doc).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(ref m) if m.contains("empty")));
    }

    #[test]
    fn mistyped_field_is_malformed() {
        let mut doc = current_value();
        doc["main"]["temp"] = json!("warm");

        assert!(matches!(normalize(&doc), Err(WeatherError::MalformedResponse(_))));
    }
}
