//! City store state and its reducer.
//!
//! Every change to [`StoreState`] goes through [`reduce`], which consumes the
//! previous snapshot and returns the next one. Actions form a closed set, so
//! there is no "unknown action" at runtime.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::{City, CityId};

/// Misuse of the store by the calling code. Never recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("city store is not configured: send Event::Configure before any operation")]
    NotConfigured,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreState {
    pub cities: Vec<City>,
    pub is_loading: bool,
    pub current_city: Option<City>,
    /// Empty when there is no error.
    pub error: String,
}

impl StoreState {
    pub fn current_city_id(&self) -> Option<&CityId> {
        self.current_city.as_ref().map(|c| &c.id)
    }

    pub fn find(&self, id: &CityId) -> Option<&City> {
        self.cities.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CityId) -> bool {
        self.find(id).is_some()
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Loading,
    CitiesListed(Vec<City>),
    CitiesLoaded(City),
    CitiesCreated(City),
    CitiesDeleted(CityId),
    Rejected(String),
}

impl Action {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::CitiesListed(_) => "cities/listed",
            Self::CitiesLoaded(_) => "cities/loaded",
            Self::CitiesCreated(_) => "cities/created",
            Self::CitiesDeleted(_) => "cities/deleted",
            Self::Rejected(_) => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Keeps the first occurrence of each id, preserving order.
pub fn dedupe_by_id(cities: Vec<City>) -> Vec<City> {
    let mut seen = HashSet::with_capacity(cities.len());
    cities
        .into_iter()
        .filter(|city| {
            let fresh = seen.insert(city.id.clone());
            if !fresh {
                warn!(id = %city.id, "dropping duplicate city id");
            }
            fresh
        })
        .collect()
}

#[must_use]
pub fn reduce(state: StoreState, action: Action) -> StoreState {
    match action {
        Action::Loading => StoreState {
            is_loading: true,
            ..state
        },

        Action::CitiesListed(cities) => {
            let cities = dedupe_by_id(cities);
            let current_city = state
                .current_city
                .filter(|current| cities.iter().any(|c| c.id == current.id));
            StoreState {
                is_loading: false,
                cities,
                current_city,
                ..state
            }
        }

        Action::CitiesLoaded(city) => StoreState {
            is_loading: false,
            current_city: Some(city),
            ..state
        },

        Action::CitiesCreated(city) => {
            if state.contains(&city.id) {
                warn!(id = %city.id, "ignoring created city with an id already in the store");
                return StoreState {
                    is_loading: false,
                    ..state
                };
            }

            let mut cities = state.cities;
            cities.push(city.clone());
            StoreState {
                is_loading: false,
                cities,
                current_city: Some(city),
                ..state
            }
        }

        Action::CitiesDeleted(id) => {
            let mut cities = state.cities;
            cities.retain(|c| c.id != id);
            StoreState {
                is_loading: false,
                cities,
                current_city: state.current_city.filter(|c| c.id != id),
                ..state
            }
        }

        Action::Rejected(message) => StoreState {
            is_loading: false,
            error: message,
            ..state
        },
    }
}
