use chrono::{DateTime, Utc};

use crate::{City, WeatherResponse};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data";

/// Display-ready projection of the latest weather fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub city_name: String,
    pub cities_search_results: Vec<City>,
    pub temperature: String,
    pub temperature_min_max: String,
    pub feels_like: String,
    pub humidity: String,
    pub weather_description: String,
    pub weather_icon_url: Option<String>,
    /// Raw icon bytes, as downloaded.
    pub weather_icon: Option<Vec<u8>>,
    pub error_message: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl WeatherState {
    /// Overwrite every weather field from `response`.
    ///
    /// Fields from an earlier response never survive this call, including
    /// the description and icon when the response carries no conditions.
    pub fn apply_response(&mut self, response: &WeatherResponse, icon_base_url: &str) {
        let main = &response.main;
        let condition = response.weather.first();

        self.temperature = format_degrees(main.temp);
        self.temperature_min_max =
            format!("{} / {}", format_degrees(main.temp_max), format_degrees(main.temp_min));
        self.feels_like = format_degrees(main.feels_like);
        self.humidity = format!("{}%", main.humidity);
        self.weather_description =
            condition.map(|c| capitalize_words(&c.main)).unwrap_or_default();
        self.weather_icon_url = condition.map(|c| c.icon_url(icon_base_url));
        self.weather_icon = None;
        self.error_message = None;
        self.last_updated = Some(Utc::now());
    }

    pub fn has_weather(&self) -> bool {
        self.last_updated.is_some()
    }
}

/// `68.0` renders as `"68.0°"`, `68.25` as `"68.25°"`.
pub fn format_degrees(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}°")
    } else {
        format!("{value}°")
    }
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
