//! Weather source trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Current conditions in imperial units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub humidity_pct: f64,
    pub wind_mph: f64,
}

/// Nearest whole number, ties to even. Integer output never shows `-0`.
fn whole(value: f64) -> i64 {
    value.round_ties_even() as i64
}

impl std::fmt::Display for CurrentWeather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}°F, feels like {}°F, {}% humidity, {} mph wind",
            whole(self.temperature_f),
            whole(self.feels_like_f),
            whole(self.humidity_pct),
            whole(self.wind_mph)
        )
    }
}

/// A single stateless lookup of current conditions.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> Result<CurrentWeather, WeatherError>;
}
