//! Static catalog of pools the passport can stamp.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single stampable location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Artwork shown once the location is stamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp_image: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lng,
            stamp_image: None,
        }
    }

    #[must_use]
    pub fn with_stamp_image(mut self, image: impl Into<String>) -> Self {
        self.stamp_image = Some(image.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Catalog JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate location id: {0}")]
    DuplicateId(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<Location>),
    Wrapped { pools: Vec<Location> },
}

/// Ordered, read-only sequence of locations with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    locations: Vec<Location>,
}

impl Catalog {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            locations: Vec::new(),
        }
    }

    /// Build a catalog, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two locations share an id.
    pub fn new(locations: Vec<Location>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(locations.len());
        for location in &locations {
            if !seen.insert(location.id.as_str()) {
                return Err(CatalogError::DuplicateId(location.id.clone()));
            }
        }
        Ok(Self { locations })
    }

    /// Parse either a bare array of locations or `{ "pools": [...] }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or ids repeat.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let locations = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::Bare(locations) | CatalogDocument::Wrapped { pools: locations } => {
                locations
            }
        };
        Self::new(locations)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.locations.iter().position(|location| location.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.locations.iter()
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
