use crate::{
    City, Config, WeatherResponse,
    api::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to send request to OpenWeather: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status { endpoint: &'static str, status: StatusCode, body: String },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote weather data source.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Current conditions at the given coordinates.
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherResponse, ApiError>;

    /// Cities matching a free-text query, in the order the API ranks them.
    async fn fetch_cities(&self, query: &str) -> Result<Vec<City>, ApiError>;

    /// Raw bytes of a condition icon.
    async fn fetch_icon(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

#[async_trait]
impl<T: WeatherApi + ?Sized> WeatherApi for Arc<T> {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherResponse, ApiError> {
        (**self).fetch_weather(lat, lon).await
    }

    async fn fetch_cities(&self, query: &str) -> Result<Vec<City>, ApiError> {
        (**self).fetch_cities(query).await
    }

    async fn fetch_icon(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        (**self).fetch_icon(url).await
    }
}

/// Construct the OpenWeather client from config.
pub fn api_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.require_api_key()?;
    OpenWeatherClient::new(api_key.to_owned(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = api_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn api_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(api_from_config(&cfg).is_ok());
    }

    #[test]
    fn status_error_names_endpoint() {
        let err = ApiError::Status {
            endpoint: "weather",
            status: StatusCode::UNAUTHORIZED,
            body: "Invalid API key".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("weather request failed"));
        assert!(msg.contains("401"));
    }
}
