use tokio::sync::watch;

use crate::{
    City,
    api::WeatherApi,
    location::LocationResolver,
    state::{FETCH_FAILED_MESSAGE, WeatherState},
    store::{CityStore, SELECTED_CITY_KEY},
};

/// Binds location updates and weather fetches to an observable [`WeatherState`].
///
/// Every operation writes the state through a `watch` channel, so observers
/// see the latest write and nothing older.
#[derive(Debug)]
pub struct WeatherViewModel {
    api: Box<dyn WeatherApi>,
    location: Box<dyn LocationResolver>,
    store: Box<dyn CityStore>,
    icon_base_url: String,
    state: watch::Sender<WeatherState>,
}

impl WeatherViewModel {
    pub fn new(
        api: Box<dyn WeatherApi>,
        location: Box<dyn LocationResolver>,
        store: Box<dyn CityStore>,
        icon_base_url: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(WeatherState::default());
        Self { api, location, store, icon_base_url: icon_base_url.into(), state }
    }

    pub fn state(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &dyn CityStore {
        self.store.as_ref()
    }

    /// Weather for the saved city, or for the device location if none is saved.
    pub async fn fetch_initial_data(&self) {
        match self.store.get_city(SELECTED_CITY_KEY) {
            Ok(Some(city)) => self.fetch_weather_data(&city).await,
            Ok(None) => self.fetch_location_weather().await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved city");
                self.fetch_location_weather().await
            }
        }
    }

    pub async fn fetch_location_weather(&self) {
        match self.location.resolve_city().await {
            Ok(city) => self.fetch_weather_data(&city).await,
            Err(e) => tracing::warn!(error = %e, "Location lookup failed"),
        }
    }

    /// A city picked from the search results.
    pub async fn select_city(&self, city: &City) {
        self.fetch_weather_data(city).await;
    }

    pub async fn fetch_weather_data(&self, city: &City) {
        let city_name = city.formatted_name();
        self.state.send_modify(|s| s.city_name = city_name);

        let response = match self.api.fetch_weather(city.lat, city.lon).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(city = %city.name, error = %e, "Weather fetch failed");
                self.state
                    .send_modify(|s| s.error_message = Some(FETCH_FAILED_MESSAGE.to_string()));
                return;
            }
        };

        self.state.send_modify(|s| s.apply_response(&response, &self.icon_base_url));

        if let Err(e) = self.store.save_city(city, SELECTED_CITY_KEY) {
            tracing::warn!(city = %city.name, error = %e, "Failed to save selected city");
        }

        let icon_url = self.state.borrow().weather_icon_url.clone();
        if let Some(url) = icon_url {
            self.load_icon(url).await;
        }
    }

    pub async fn fetch_cities(&self, query: &str) {
        match self.api.fetch_cities(query).await {
            Ok(cities) => self.state.send_modify(|s| s.cities_search_results = cities),
            Err(e) => tracing::warn!(query, error = %e, "Error fetching cities"),
        }
    }

    async fn load_icon(&self, url: String) {
        let icon = match self.api.fetch_icon(&url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(%url, error = %e, "Icon download failed");
                None
            }
        };

        // A newer response may have replaced the icon while this one downloaded.
        self.state.send_if_modified(|s| {
            if s.weather_icon_url.as_deref() != Some(url.as_str()) {
                return false;
            }
            s.weather_icon = icon;
            true
        });
    }
}
