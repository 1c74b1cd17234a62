use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{City, config::project_dirs};

/// Key the last selected city is stored under.
pub const SELECTED_CITY_KEY: &str = "selectedCity";

/// Key-value persistence for a [`City`].
pub trait CityStore: Send + Sync + Debug {
    fn save_city(&self, city: &City, key: &str) -> Result<()>;
    fn get_city(&self, key: &str) -> Result<Option<City>>;
}

/// JSON object on disk mapping keys to stored values.
#[derive(Debug, Clone)]
pub struct FileCityStore {
    path: PathBuf,
}

impl FileCityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(project_dirs()?.data_dir().join("store.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_contents(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))
    }

    fn parse(&self, contents: &str) -> Result<Map<String, Value>> {
        serde_json::from_str(contents)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        match self.read_contents()? {
            Some(contents) => self.parse(&contents),
            None => Ok(Map::new()),
        }
    }

    /// Write through a sibling file so a crash never leaves a truncated store.
    fn write_all(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize store")?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write store file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))
    }
}

impl CityStore for FileCityStore {
    fn save_city(&self, city: &City, key: &str) -> Result<()> {
        let mut entries = match self.read_contents()? {
            Some(contents) => self.parse(&contents).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable store contents");
                Map::new()
            }),
            None => Map::new(),
        };
        entries.insert(
            key.to_string(),
            serde_json::to_value(city).context("Failed to serialize city")?,
        );

        self.write_all(&entries)?;

        tracing::debug!(key, city = %city.name, "City saved");
        Ok(())
    }

    fn get_city(&self, key: &str) -> Result<Option<City>> {
        let Some(value) = self.read_all()?.remove(key) else {
            return Ok(None);
        };

        let city = serde_json::from_value(value)
            .with_context(|| format!("Stored value under '{key}' is not a city"))?;
        Ok(Some(city))
    }
}

#[derive(Debug, Default)]
pub struct MemoryCityStore {
    entries: Mutex<HashMap<String, City>>,
}

impl MemoryCityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(key: &str, city: City) -> Self {
        let store = Self::default();
        store.lock().insert(key.to_string(), city);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, City>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CityStore for MemoryCityStore {
    fn save_city(&self, city: &City, key: &str) -> Result<()> {
        self.lock().insert(key.to_string(), city.clone());
        Ok(())
    }

    fn get_city(&self, key: &str) -> Result<Option<City>> {
        Ok(self.lock().get(key).cloned())
    }
}
