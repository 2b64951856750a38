use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::position::{parse_coordinates, PositionError};
use crate::source::DataSource;
use crate::store::{reduce, Action, StoreError, StoreState};

/// Opaque city identifier. The placeholder backend sometimes hands out
/// numeric ids, so decoding accepts both JSON strings and integers.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(pub String);

impl CityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

impl<'de> Deserialize<'de> for CityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Integer(n) => Self(n.to_string()),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Text(String),
    Number(f64),
}

fn coordinate_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawCoordinate::deserialize(deserializer)? {
        RawCoordinate::Text(s) => s,
        RawCoordinate::Number(n) => n.to_string(),
    })
}

/// Map position as it travels on the wire: coordinates kept as text.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    #[serde(deserialize_with = "coordinate_text")]
    pub lat: String,
    #[serde(deserialize_with = "coordinate_text")]
    pub lng: String,
}

impl Position {
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    /// Parsed `(lat, lng)` in degrees.
    pub fn coordinates(&self) -> Result<(f64, f64), PositionError> {
        parse_coordinates(Some(&self.lat), Some(&self.lng))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub position: Position,
}

/// A city as submitted by the form, before an id is assigned.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub position: Position,
}

impl NewCity {
    pub fn new(city_name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            country: country.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn into_city(self, id: CityId) -> City {
        City {
            id,
            city_name: self.city_name,
            country: self.country,
            emoji: self.emoji,
            date: self.date,
            notes: self.notes,
            position: self.position,
        }
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub state: StoreState,
    pub source: Option<DataSource>,
    /// Bumped on every `Event::Configure`; responses from older values are dropped.
    pub generation: u64,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_mut(&mut self) -> Result<&mut DataSource, StoreError> {
        self.source.as_mut().ok_or(StoreError::NotConfigured)
    }

    /// Replaces the state with the reducer's output for `action`.
    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(
            action = action.tag(),
            terminal = action.is_terminal(),
            "dispatch"
        );
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }
}
