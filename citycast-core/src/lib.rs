//! Core library for the `citycast` weather client.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client and its `WeatherApi` abstraction
//! - Location resolution (device fix + reverse geocoding to a city)
//! - Persistence of the last selected city
//! - The observable, display-ready `WeatherState` and the view model driving it
//!
//! It is used by `citycast-cli`, but can also back other front-ends.

pub mod api;
pub mod config;
pub mod location;
pub mod model;
pub mod state;
pub mod store;
pub mod view_model;

pub use api::{ApiError, WeatherApi, api_from_config, openweather::OpenWeatherClient};
pub use config::{Config, Units};
pub use location::{
    FixedLocation, LocationError, LocationManager, LocationResolver, LocationSource, NoLocation,
    Placemark, ReverseGeocoder,
};
pub use model::{City, Coordinates, MainWeatherData, WeatherCondition, WeatherResponse};
pub use state::{FETCH_FAILED_MESSAGE, WeatherState};
pub use store::{CityStore, FileCityStore, MemoryCityStore, SELECTED_CITY_KEY};
pub use view_model::WeatherViewModel;
