//! Curated location records served by the random-drop catalog

use serde::{Deserialize, Serialize};

/// A stored catalog entry.
///
/// Serialized with the `lat` / `lng` names the web client reads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct LocationRecord {
    /// Assigned by the store on insert, monotonic
    pub id: i64,
    #[serde(rename = "lat")]
    #[sqlx(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    #[sqlx(rename = "lng")]
    pub longitude: f64,
    pub description: Option<String>,
}

/// A record that has not been inserted yet
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewLocation {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewLocation {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
