use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    City, Config, Coordinates, WeatherResponse,
    config::Units,
    location::{LocationError, Placemark, ReverseGeocoder},
};

use super::{ApiError, WeatherApi};

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    units: Units,
    search_limit: u8,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            units: config.units,
            search_limit: config.search_limit,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(endpoint, %url, "Sending OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherResponse, ApiError> {
        let parsed: WeatherResponse = self
            .get_json(
                "weather",
                "/data/2.5/weather",
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("units", self.units.as_str().to_string()),
                ],
            )
            .await?;

        tracing::info!(city = %parsed.name, temp = parsed.main.temp, "Weather data fetched");
        Ok(parsed)
    }

    async fn fetch_cities(&self, query: &str) -> Result<Vec<City>, ApiError> {
        let cities: Vec<City> = self
            .get_json(
                "city search",
                "/geo/1.0/direct",
                &[("q", query.to_string()), ("limit", self.search_limit.to_string())],
            )
            .await?;

        tracing::debug!(query, count = cities.len(), "City search completed");
        Ok(cities)
    }

    async fn fetch_icon(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let res = self.http.get(url).send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { endpoint: "icon", status, body: truncate_body(&body) });
        }

        Ok(res.bytes().await?.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct OwReverseEntry {
    name: String,
    country: Option<String>,
    state: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for OpenWeatherClient {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Vec<Placemark>, LocationError> {
        let entries: Vec<OwReverseEntry> = self
            .get_json(
                "reverse geocoding",
                "/geo/1.0/reverse",
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await
            .map_err(|e| LocationError::Geocoding(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|e| Placemark {
                locality: Some(e.name).filter(|n| !n.is_empty()),
                administrative_area: e.state,
                country: e.country,
            })
            .collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
