//! Resolving the device location to a [`City`].
//!
//! The platform location service is an external collaborator: it is
//! modelled by [`LocationSource`], and [`LocationManager`] turns a fix into
//! a city through a [`ReverseGeocoder`].

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{City, Coordinates};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Failed to find user's location: {0}")]
    Unavailable(String),

    #[error("Error in reverse geocoding: {0}")]
    Geocoding(String),

    #[error("No city found for location.")]
    NoCity,
}

/// A reverse-geocoded place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placemark {
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    pub country: Option<String>,
}

/// One-shot "request current location".
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn request_location(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
impl<T: LocationSource + ?Sized> LocationSource for Box<T> {
    async fn request_location(&self) -> Result<Coordinates, LocationError> {
        (**self).request_location().await
    }
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Vec<Placemark>, LocationError>;
}

#[async_trait]
impl<T: ReverseGeocoder + ?Sized> ReverseGeocoder for Arc<T> {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Vec<Placemark>, LocationError> {
        (**self).reverse_geocode(at).await
    }
}

/// Resolve the device location to a city.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve_city(&self) -> Result<City, LocationError>;
}

/// Location given up front, e.g. from command-line arguments.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn request_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Source for environments with no location service at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn request_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable("no location source available".into()))
    }
}

#[derive(Debug)]
pub struct LocationManager<S, G> {
    source: S,
    geocoder: G,
}

impl<S, G> LocationManager<S, G> {
    pub fn new(source: S, geocoder: G) -> Self {
        Self { source, geocoder }
    }
}

#[async_trait]
impl<S, G> LocationResolver for LocationManager<S, G>
where
    S: LocationSource,
    G: ReverseGeocoder,
{
    async fn resolve_city(&self) -> Result<City, LocationError> {
        let fix = self.source.request_location().await?;
        tracing::debug!(lat = fix.lat, lon = fix.lon, "Location fix received");

        let placemark = self
            .geocoder
            .reverse_geocode(fix)
            .await?
            .into_iter()
            .next()
            .ok_or(LocationError::NoCity)?;

        let name = placemark.locality.ok_or(LocationError::NoCity)?;

        Ok(City {
            name,
            lat: fix.lat,
            lon: fix.lon,
            country: placemark.country,
            state: placemark.administrative_area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubGeocoder(Result<Vec<Placemark>, LocationError>);

    #[async_trait]
    impl ReverseGeocoder for StubGeocoder {
        async fn reverse_geocode(&self, _at: Coordinates) -> Result<Vec<Placemark>, LocationError> {
            self.0.clone()
        }
    }

    const SF: Coordinates = Coordinates { lat: 37.7749, lon: -122.4194 };

    #[tokio::test]
    async fn resolves_first_placemark_into_city() {
        let manager = LocationManager::new(
            FixedLocation(SF),
            StubGeocoder(Ok(vec![
                Placemark {
                    locality: Some("San Francisco".into()),
                    administrative_area: Some("California".into()),
                    country: Some("US".into()),
                },
                Placemark { locality: Some("Oakland".into()), ..Placemark::default() },
            ])),
        );

        let city = manager.resolve_city().await.expect("city");
        assert_eq!(
            city,
            City::new("San Francisco", SF.lat, SF.lon).with_state("California").with_country("US")
        );
    }

    #[tokio::test]
    async fn missing_locality_is_no_city() {
        let manager = LocationManager::new(
            FixedLocation(SF),
            StubGeocoder(Ok(vec![Placemark {
                country: Some("US".into()),
                ..Placemark::default()
            }])),
        );
        assert_eq!(manager.resolve_city().await.unwrap_err(), LocationError::NoCity);
    }

    #[tokio::test]
    async fn empty_placemarks_is_no_city() {
        let manager = LocationManager::new(FixedLocation(SF), StubGeocoder(Ok(vec![])));
        assert_eq!(manager.resolve_city().await.unwrap_err(), LocationError::NoCity);
    }

    #[tokio::test]
    async fn source_failure_propagates() {
        let manager = LocationManager::new(NoLocation, StubGeocoder(Ok(vec![])));
        assert!(matches!(manager.resolve_city().await, Err(LocationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn geocoding_failure_propagates() {
        let manager = LocationManager::new(
            FixedLocation(SF),
            StubGeocoder(Err(LocationError::Geocoding("timeout".into()))),
        );
        assert_eq!(
            manager.resolve_city().await.unwrap_err(),
            LocationError::Geocoding("timeout".into())
        );
    }
}
