use serde::{Deserialize, Serialize};

/// A named geographic point with optional administrative metadata.
///
/// Field names match the OpenWeather geocoding API, so search results
/// deserialize straight into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl City {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self { name: name.into(), lat, lon, country: None, state: None }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// "Name, State, Country" with absent parts skipped.
    pub fn formatted_name(&self) -> String {
        [Some(self.name.as_str()), self.state.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl WeatherCondition {
    pub fn icon_url(&self, base: &str) -> String {
        format!("{}/{}@2x.png", base.trim_end_matches('/'), self.icon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainWeatherData {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u32,
}

/// One current-weather payload, parsed wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub coord: Coordinates,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub main: MainWeatherData,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_name_skips_missing_parts() {
        let full = City::new("San Francisco", 37.7749, -122.4194)
            .with_state("California")
            .with_country("US");
        assert_eq!(full.formatted_name(), "San Francisco, California, US");

        let partial = City::new("Paris", 48.8566, 2.3522).with_country("FR");
        assert_eq!(partial.formatted_name(), "Paris, FR");

        assert_eq!(City::new("Nowhere", 0.0, 0.0).formatted_name(), "Nowhere");
    }

    #[test]
    fn icon_url_tolerates_trailing_slash() {
        let cond = WeatherCondition {
            id: 800,
            main: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
        };
        assert_eq!(
            cond.icon_url("https://openweathermap.org/img/wn/"),
            "https://openweathermap.org/img/wn/01d@2x.png"
        );
    }

    #[test]
    fn parses_current_weather_payload() {
        let body = r#"{
            "coord": {"lon": -122.4194, "lat": 37.7749},
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "base": "stations",
            "main": {"temp": 68.0, "feels_like": 67.1, "temp_min": 65.0, "temp_max": 70.0,
                     "pressure": 1013, "humidity": 77},
            "visibility": 10000,
            "name": "San Francisco"
        }"#;

        let parsed: WeatherResponse = serde_json::from_str(body).expect("valid payload");
        assert_eq!(parsed.name, "San Francisco");
        assert_eq!(parsed.weather.len(), 1);
        assert_eq!(parsed.main.humidity, 77);
        assert_eq!(parsed.coord.lat, 37.7749);
    }

    #[test]
    fn parses_geocoding_entry_without_state() {
        let body = r#"{"name": "London", "local_names": {"en": "London"},
                       "lat": 51.5073, "lon": -0.1276, "country": "GB"}"#;
        let city: City = serde_json::from_str(body).expect("valid city");
        assert_eq!(city.country.as_deref(), Some("GB"));
        assert!(city.state.is_none());
    }
}
