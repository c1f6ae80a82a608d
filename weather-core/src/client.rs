use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    config::{Config, Units},
    error::{WeatherError, WeatherResult},
    http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport},
    model::{CityQuery, FetchResult, FetchedWeather, RawPayloads},
    pipeline::{build_series, normalize},
};

/// Everything the client needs to address the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub api_key: String,
    pub base_url: String,
    pub forecast_url: String,
    pub units: Units,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    settings: ApiSettings,
    http: Arc<dyn HttpTransport>,
}

impl WeatherClient {
    pub fn new(settings: ApiSettings, http: Arc<dyn HttpTransport>) -> Self {
        Self { settings, http }
    }

    /// Build a client backed by reqwest, honouring the configured timeout.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let settings = config.api_settings()?;
        let transport =
            ReqwestTransport::new(config.timeout()).context("Failed to set up HTTP transport")?;

        Ok(Self::new(settings, Arc::new(transport)))
    }

    pub fn units(&self) -> Units {
        self.settings.units
    }

    /// Current conditions, then (only if that worked) the forecast.
    pub async fn fetch(&self, city: &CityQuery) -> FetchResult {
        match self.try_fetch(city).await {
            Ok(data) => {
                tracing::info!(
                    city = %city,
                    points = data.forecast.len(),
                    "fetched weather data"
                );
                FetchResult::Success(Arc::new(data))
            }
            Err(err) => {
                match &err {
                    WeatherError::MalformedResponse(detail)
                    | WeatherError::UnexpectedFailure(detail) => {
                        tracing::error!(city = %city, %detail, "unexpected weather API response");
                    }
                    other => tracing::warn!(city = %city, error = %other, "weather fetch failed"),
                }
                FetchResult::from(err)
            }
        }
    }

    async fn try_fetch(&self, city: &CityQuery) -> WeatherResult<FetchedWeather> {
        let current = self.request(Endpoint::Current, city).await?;
        let forecast = self.request(Endpoint::Forecast, city).await?;

        let conditions = normalize(&current)?;
        let series = build_series(&forecast)?;

        Ok(FetchedWeather {
            conditions,
            forecast: series,
            payloads: RawPayloads { current, forecast },
        })
    }

    async fn request(&self, endpoint: Endpoint, city: &CityQuery) -> WeatherResult<Value> {
        let url = match endpoint {
            Endpoint::Current => &self.settings.base_url,
            Endpoint::Forecast => &self.settings.forecast_url,
        };

        let request = HttpRequest::get(url.as_str())
            .with_query("q", city.as_str())
            .with_query("appid", self.settings.api_key.as_str())
            .with_query("units", self.settings.units.as_str());

        tracing::debug!(endpoint = endpoint.as_str(), url = %url, city = %city, "sending request");

        let res = self.http.get(request).await.map_err(|e| {
            WeatherError::NetworkFailure(format!("{} request failed: {e}", endpoint.as_str()))
        })?;

        classify(endpoint, city, res)
    }
}

fn classify(endpoint: Endpoint, city: &CityQuery, res: HttpResponse) -> WeatherResult<Value> {
    if !res.is_success() {
        // The forecast only runs after the current call was accepted, so any
        // status failure there is reported as a network failure.
        return Err(match (endpoint, res.status) {
            (Endpoint::Current, 401) => WeatherError::AuthenticationFailure,
            (Endpoint::Current, 404) => WeatherError::CityNotFound { city: city.to_string() },
            (_, status) => WeatherError::NetworkFailure(format!(
                "{} request failed with status {}: {}",
                endpoint.as_str(),
                status,
                truncate_body(&res.body),
            )),
        });
    }

    serde_json::from_str(&res.body).map_err(|e| {
        WeatherError::UnexpectedFailure(format!(
            "failed to parse {} JSON (status {}): {e}",
            endpoint.as_str(),
            res.status
        ))
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{
        TransportError,
        testing::{CURRENT_JSON, ScriptedTransport, forecast_json},
    };

    fn settings() -> ApiSettings {
        ApiSettings {
            api_key: "TEST_KEY".into(),
            base_url: "https://api.test/weather".into(),
            forecast_url: "https://api.test/forecast".into(),
            units: Units::Metric,
        }
    }

    fn client(transport: &Arc<ScriptedTransport>) -> WeatherClient {
        WeatherClient::new(settings(), transport.clone())
    }

    fn city(name: &str) -> CityQuery {
        CityQuery::parse(name).expect("valid city")
    }

    #[tokio::test]
    async fn success_reflects_payload_numerics() {
        let transport = Arc::new(ScriptedTransport::ok_pair(CURRENT_JSON, &forecast_json(12)));

        let data = client(&transport)
            .fetch(&city("London"))
            .await
            .into_result()
            .expect("both calls succeed");

        assert_eq!(data.conditions.temperature, 12.34);
        assert_eq!(data.conditions.feels_like, 10.96);
        assert_eq!(data.conditions.wind_speed, 4.63);
        assert_eq!(data.conditions.pressure, 1012);
        assert_eq!(data.forecast.len(), 8);
        assert_eq!(data.payloads.current["name"], "London");
        assert_eq!(data.payloads.forecast["list"].as_array().map(Vec::len), Some(12));
    }

    #[tokio::test]
    async fn requests_carry_city_key_and_units() {
        let transport = Arc::new(ScriptedTransport::ok_pair(CURRENT_JSON, &forecast_json(2)));
        client(&transport).fetch(&city("  São Paulo ")).await;

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://api.test/weather");
        assert_eq!(requests[1].url, "https://api.test/forecast");
        for req in &requests {
            assert_eq!(req.query_value("q"), Some("São Paulo"));
            assert_eq!(req.query_value("appid"), Some("TEST_KEY"));
            assert_eq!(req.query_value("units"), Some("metric"));
        }
    }

    #[tokio::test]
    async fn unauthorized_stops_before_forecast() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            401,
            r#"{"cod":401,"message":"Invalid API key"}"#,
        ))]));

        let result = client(&transport).fetch(&city("London")).await;

        assert!(matches!(result, FetchResult::AuthenticationFailure));
        assert_eq!(transport.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn not_found_stops_before_forecast() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            404,
            r#"{"cod":"404","message":"city not found"}"#,
        ))]));

        let result = client(&transport).fetch(&city("Atlantis")).await;

        assert!(matches!(result, FetchResult::CityNotFound { ref city } if city == "Atlantis"));
        assert_eq!(transport.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn other_status_is_network_failure_with_detail() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::new(
            503,
            "upstream unavailable",
        ))]));

        match client(&transport).fetch(&city("London")).await {
            FetchResult::NetworkFailure(detail) => {
                assert!(detail.contains("503"), "{detail}");
                assert!(detail.contains("upstream unavailable"), "{detail}");
            }
            other => panic!("expected NetworkFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_is_network_failure() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::new(
            "connection failed: dns error",
        ))]));

        match client(&transport).fetch(&city("London")).await {
            FetchResult::NetworkFailure(detail) => assert!(detail.contains("dns error")),
            other => panic!("expected NetworkFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn forecast_failure_yields_no_partial_success() {
        for forecast in [
            Ok(HttpResponse::new(500, "boom")),
            Ok(HttpResponse::new(404, "gone")),
            Ok(HttpResponse::new(401, "nope")),
            Err(TransportError::new("request timeout")),
        ] {
            let transport = Arc::new(ScriptedTransport::new(vec![
                Ok(HttpResponse::new(200, CURRENT_JSON)),
                forecast,
            ]));

            let result = client(&transport).fetch(&city("London")).await;
            assert!(matches!(result, FetchResult::NetworkFailure(_)), "got {result:?}");
            assert_eq!(transport.recorded_requests().len(), 2);
        }
    }

    #[tokio::test]
    async fn non_json_body_is_unexpected_failure() {
        let transport = Arc::new(ScriptedTransport::ok_pair("<html>oops</html>", "{}"));

        let result = client(&transport).fetch(&city("London")).await;
        assert!(matches!(result, FetchResult::UnexpectedFailure(ref d) if d.contains("current")));
        assert_eq!(transport.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_is_unexpected_failure() {
        let forecast = forecast_json(3);
        let transport = Arc::new(ScriptedTransport::ok_pair(r#"{"name":"London"}"#, &forecast));

        let result = client(&transport).fetch(&city("London")).await;
        assert!(matches!(result, FetchResult::UnexpectedFailure(_)), "got {result:?}");
    }

    #[tokio::test]
    async fn forecast_without_list_is_unexpected_failure() {
        let transport = Arc::new(ScriptedTransport::ok_pair(CURRENT_JSON, r#"{"cod":"200"}"#));

        let result = client(&transport).fetch(&city("London")).await;
        assert!(matches!(result, FetchResult::UnexpectedFailure(ref d) if d.contains("list")));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn from_config_requires_api_key() {
        let err = WeatherClient::from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }
}
