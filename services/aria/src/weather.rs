//! OpenWeatherMap current-conditions client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Bounded wait for the weather service; a stalled request becomes a
/// `Network` error instead of suspending the session indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather API key is not configured")]
    Unconfigured,
    #[error("{0}")]
    NotFound(String),
    #[error("weather service request failed")]
    Network(#[from] reqwest::Error),
}

/// A decoded current-conditions report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_c: f64,
    pub humidity: u8,
    pub condition: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, WeatherError>;
}

/// The real client, metric units.
pub struct OpenWeatherMap {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl OpenWeatherMap {
    /// `api_key` is `None` when the module is unconfigured; every fetch then
    /// reports `WeatherError::Unconfigured`.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { client, api_key }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        let Some(key) = &self.api_key else {
            return Err(WeatherError::Unconfigured);
        };

        let response = self
            .client
            .get(API_URL)
            .query(&[("q", location), ("appid", key.as_str()), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .message
                .unwrap_or_else(|| "Location not found or invalid.".to_string());
            return Err(WeatherError::NotFound(message));
        }

        let body: ApiReport = response.json().await?;
        let condition = body
            .weather
            .first()
            .map(|w| capitalize(&w.description))
            .unwrap_or_else(|| "Unknown".to_string());
        let city = if body.name.is_empty() {
            location.to_string()
        } else {
            body.name
        };

        Ok(WeatherReport {
            city,
            temperature_c: body.main.temp,
            humidity: body.main.humidity,
            condition,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiReport {
    #[serde(default)]
    name: String,
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reports_unconfigured() {
        let provider = OpenWeatherMap::new(None);
        assert!(matches!(
            provider.fetch("London").await,
            Err(WeatherError::Unconfigured)
        ));
    }

    #[test]
    fn api_report_decodes_the_fields_we_use() {
        let raw = r#"{
            "name": "Mumbai",
            "main": {"temp": 29.4, "humidity": 74, "pressure": 1008},
            "weather": [{"id": 721, "main": "Haze", "description": "haze"}]
        }"#;
        let report: ApiReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.name, "Mumbai");
        assert_eq!(report.main.temp, 29.4);
        assert_eq!(report.main.humidity, 74);
        assert_eq!(report.weather[0].description, "haze");
    }

    #[test]
    fn capitalize_uppercases_only_the_first_letter() {
        assert_eq!(capitalize("scattered clouds"), "Scattered clouds");
        assert_eq!(capitalize(""), "");
    }
}
