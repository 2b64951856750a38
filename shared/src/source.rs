//! Where city records come from.
//!
//! The remote source is a REST API reached through the shell's HTTP effect,
//! so it only carries the base URL here. The seeded source is a plain
//! in-memory collection that answers synchronously.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{ApiBase, ConfigError};
use crate::model::{City, CityId, NewCity};
use crate::store::dedupe_by_id;

/// Faults recovered at the operation boundary. Only logged; the UI sees a
/// fixed message per operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("city {0} not found")]
    NotFound(CityId),

    #[error("could not encode request: {0}")]
    Encode(String),

    #[error("city id {0} is already taken")]
    DuplicateId(CityId),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSource {
    cities: Vec<City>,
}

impl SeedSource {
    pub fn new(cities: Vec<City>) -> Self {
        Self {
            cities: dedupe_by_id(cities),
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn contains(&self, id: &CityId) -> bool {
        self.cities.iter().any(|c| &c.id == id)
    }

    pub fn list(&self) -> Vec<City> {
        self.cities.clone()
    }

    pub fn get(&self, id: &CityId) -> Result<City, SourceError> {
        self.cities
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.clone()))
    }

    pub fn create(&mut self, new_city: NewCity) -> City {
        let city = new_city.into_city(self.fresh_id());
        self.cities.push(city.clone());
        city
    }

    pub fn delete(&mut self, id: &CityId) -> Result<CityId, SourceError> {
        let index = self
            .cities
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| SourceError::NotFound(id.clone()))?;
        Ok(self.cities.remove(index).id)
    }

    /// Random ids are re-rolled until they are unused in this collection.
    fn fresh_id(&self) -> CityId {
        loop {
            let id = CityId::generate();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(ApiBase),
    Seeded(SeedSource),
}

/// Chosen once at start-up and sent in with `Event::Configure`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    Remote { base_url: ApiBase },
    Seeded { cities: Vec<City> },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Remote {
            base_url: ApiBase::default(),
        }
    }
}

impl StoreConfig {
    pub fn remote(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self::Remote {
            base_url: ApiBase::new(base_url)?,
        })
    }

    pub fn seeded(cities: Vec<City>) -> Self {
        Self::Seeded { cities }
    }

    pub fn into_source(self) -> DataSource {
        match self {
            Self::Remote { base_url } => DataSource::Remote(base_url),
            Self::Seeded { cities } => DataSource::Seeded(SeedSource::new(cities)),
        }
    }
}
