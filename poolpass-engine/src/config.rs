//! Engine configuration loaded alongside the catalog.
use serde::{Deserialize, Serialize};

use crate::codec::StorageKeys;
use crate::constants::{DEFAULT_KEY_PREFIX, DEFAULT_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::dates::DateStyle;

/// Tunables for a passport session. Every field has a default so partial
/// JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stamps per page in the summary view.
    pub page_size: usize,
    /// Namespace for the persisted slots.
    pub key_prefix: String,
    /// Form in which clocks render "today".
    pub date_format: DateStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            date_format: DateStyle::Display,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Coerce out-of-range values into their valid range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(MIN_PAGE_SIZE);
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::with_prefix(&self.key_prefix)
    }
}
