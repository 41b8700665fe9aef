//! Weather tool and the Open-Meteo source behind it.
//!
//! The tool never fails: any source error is logged and the model is told
//! the weather is unavailable.

use async_trait::async_trait;
use homehub_core::error::{ToolError, WeatherError};
use homehub_core::tool::{Arguments, Tool, ToolSpec};
use homehub_core::weather::{CurrentWeather, WeatherSource};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const UNAVAILABLE: &str = "Weather is currently unavailable.";
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// `get_current_weather`: current conditions at the household's location.
pub struct GetWeatherTool {
    spec: ToolSpec,
    source: Arc<dyn WeatherSource>,
}

impl GetWeatherTool {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            spec: ToolSpec::new("get_current_weather", "Get current weather at home"),
            source,
        }
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, _arguments: &Arguments) -> Result<String, ToolError> {
        match self.source.current().await {
            Ok(weather) => Ok(weather.to_string()),
            Err(e) => {
                warn!(error = %e, "Weather lookup failed");
                Ok(UNAVAILABLE.to_string())
            }
        }
    }
}

/// Open-Meteo forecast API, current conditions in °F and mph.
pub struct OpenMeteoSource {
    base_url: String,
    latitude: f64,
    longitude: f64,
    client: reqwest::Client,
}

impl OpenMeteoSource {
    pub fn new(latitude: f64, longitude: f64, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            latitude,
            longitude,
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn query(&self) -> [(&'static str, String); 6] {
        [
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m"
                    .into(),
            ),
            ("temperature_unit", "fahrenheit".into()),
            ("wind_speed_unit", "mph".into()),
            ("forecast_days", "1".into()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
}

impl TryFrom<ForecastResponse> for CurrentWeather {
    type Error = WeatherError;

    fn try_from(resp: ForecastResponse) -> Result<Self, Self::Error> {
        let current = resp.current.ok_or(WeatherError::MissingField("current"))?;
        Ok(CurrentWeather {
            temperature_f: current
                .temperature_2m
                .ok_or(WeatherError::MissingField("temperature_2m"))?,
            feels_like_f: current
                .apparent_temperature
                .ok_or(WeatherError::MissingField("apparent_temperature"))?,
            humidity_pct: current
                .relative_humidity_2m
                .ok_or(WeatherError::MissingField("relative_humidity_2m"))?,
            wind_mph: current
                .wind_speed_10m
                .ok_or(WeatherError::MissingField("wind_speed_10m"))?,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn current(&self) -> Result<CurrentWeather, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        debug!(latitude = self.latitude, longitude = self.longitude, "Fetching weather");

        let response = self
            .client
            .get(&url)
            .query(&self.query())
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Request(format!("unreadable forecast: {e}")))?;

        CurrentWeather::try_from(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWeather(Result<CurrentWeather, WeatherError>);

    #[async_trait]
    impl WeatherSource for FixedWeather {
        async fn current(&self) -> Result<CurrentWeather, WeatherError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn formats_current_conditions() {
        let tool = GetWeatherTool::new(Arc::new(FixedWeather(Ok(CurrentWeather {
            temperature_f: 72.0,
            feels_like_f: 70.0,
            humidity_pct: 40.0,
            wind_mph: 5.0,
        }))));
        let out = tool.call(&Arguments::new()).await.unwrap();
        assert_eq!(out, "72°F, feels like 70°F, 40% humidity, 5 mph wind");
    }

    #[tokio::test]
    async fn source_failure_degrades_to_unavailable() {
        let tool = GetWeatherTool::new(Arc::new(FixedWeather(Err(WeatherError::Request(
            "connection refused".into(),
        )))));
        let out = tool.call(&Arguments::new()).await.unwrap();
        assert_eq!(out, UNAVAILABLE);
    }

    #[test]
    fn parses_open_meteo_payload() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{
                "latitude": 40.58,
                "longitude": -105.08,
                "current_units": {"temperature_2m": "°F"},
                "current": {
                    "time": "2026-10-18T14:00",
                    "temperature_2m": 61.3,
                    "relative_humidity_2m": 22,
                    "apparent_temperature": 57.9,
                    "weather_code": 1,
                    "wind_speed_10m": 8.4
                }
            }"#,
        )
        .unwrap();
        let weather = CurrentWeather::try_from(forecast).unwrap();
        assert_eq!(weather.to_string(), "61°F, feels like 58°F, 22% humidity, 8 mph wind");
    }

    #[test]
    fn missing_current_block_is_an_error() {
        let forecast: ForecastResponse = serde_json::from_str(r#"{"latitude": 1.0}"#).unwrap();
        let err = CurrentWeather::try_from(forecast).unwrap_err();
        assert!(matches!(err, WeatherError::MissingField("current")));
    }

    #[test]
    fn query_asks_for_imperial_units() {
        let source = OpenMeteoSource::new(40.5853, -105.0844, Duration::from_secs(8));
        let query = source.query();
        assert_eq!(query[0], ("latitude", "40.5853".to_string()));
        assert!(query.iter().any(|(k, v)| *k == "temperature_unit" && v == "fahrenheit"));
        assert!(query.iter().any(|(k, v)| *k == "wind_speed_unit" && v == "mph"));
    }
}
