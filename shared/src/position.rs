//! Map position carried in the page URL (`?lat=..&lng=..`).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{form_urlencoded, Url};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error("position is missing {0}")]
    Missing(&'static str),

    #[error("{axis} is not a number: {value:?}")]
    NotANumber { axis: &'static str, value: String },

    #[error("{axis} out of range: {value}")]
    OutOfRange { axis: &'static str, value: f64 },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

fn parse_axis(axis: &'static str, raw: Option<&str>, limit: f64) -> Result<f64, PositionError> {
    let raw = raw.ok_or(PositionError::Missing(axis))?;
    let value: f64 = raw.trim().parse().map_err(|_| PositionError::NotANumber {
        axis,
        value: raw.to_string(),
    })?;
    if !value.is_finite() || !(-limit..=limit).contains(&value) {
        return Err(PositionError::OutOfRange { axis, value });
    }
    Ok(value)
}

pub(crate) fn parse_coordinates(
    lat: Option<&str>,
    lng: Option<&str>,
) -> Result<(f64, f64), PositionError> {
    Ok((parse_axis("lat", lat, 90.0)?, parse_axis("lng", lng, 180.0)?))
}

/// Raw `lat`/`lng` query values; `None` when the parameter is absent.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlPosition {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl UrlPosition {
    /// Accepts a query string with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let mut position = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "lat" if position.lat.is_none() => position.lat = Some(value.into_owned()),
                "lng" if position.lng.is_none() => position.lng = Some(value.into_owned()),
                _ => {}
            }
        }
        position
    }

    pub fn from_url(url: &str) -> Result<Self, PositionError> {
        let parsed = Url::parse(url).map_err(|e| PositionError::InvalidUrl(e.to_string()))?;
        Ok(Self::from_query(parsed.query().unwrap_or_default()))
    }

    pub fn is_set(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }

    pub fn coordinates(&self) -> Result<(f64, f64), PositionError> {
        parse_coordinates(self.lat.as_deref(), self.lng.as_deref())
    }
}
