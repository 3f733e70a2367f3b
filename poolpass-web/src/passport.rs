//! Web-specific passport implementation
//!
//! This module provides web-specific implementations of the poolpass-engine
//! traits and re-exports the core engine types.

use serde::de::DeserializeOwned;

use crate::clock::BrowserClock;
use crate::dom;

// Re-export all types from poolpass-engine
pub use poolpass_engine::*;

/// Web-specific catalog loader reading the bundled static assets
pub struct WebCatalogLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("Unknown config: {0}")]
    UnknownConfig(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl CatalogLoader for WebCatalogLoader {
    type Error = WebDataError;

    fn load_locations(&self) -> Result<Catalog, Self::Error> {
        let json = include_str!("../static/data/pools.json");
        Ok(Catalog::from_json(json)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let json = match config_name {
            ENGINE_CONFIG_NAME => include_str!("../static/data/engine.json"),
            _ => return Err(WebDataError::UnknownConfig(config_name.to_string())),
        };
        serde_json::from_str(json).map_err(WebDataError::Json)
    }
}

/// Web-specific persistent store using localStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStore;

fn storage() -> Result<web_sys::Storage, StoreError> {
    dom::local_storage().map_err(|e| StoreError::Unavailable(dom::js_error_message(&e)))
}

impl PersistentStore for WebStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        storage()?.get_item(key).map_err(|e| StoreError::Read {
            key: key.to_string(),
            reason: dom::js_error_message(&e),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        storage()?.set_item(key, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: dom::js_error_message(&e),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        storage()?.remove_item(key).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: dom::js_error_message(&e),
        })
    }
}

pub type WebSession = StampSession<WebStore, BrowserClock>;

/// Load the bundled engine config, falling back to defaults.
#[must_use]
pub fn web_engine_config() -> EngineConfig {
    WebCatalogLoader
        .load_config::<EngineConfig>(ENGINE_CONFIG_NAME)
        .unwrap_or_else(|err| {
            log::warn!("Using default engine config: {err}");
            EngineConfig::default()
        })
}

/// Open a session over `store` with the bundled catalog and config. The
/// clock formats dates in the configured style.
#[must_use]
pub fn open_web_session<S: PersistentStore>(store: S) -> StampSession<S, BrowserClock> {
    let clock = BrowserClock::new(web_engine_config().date_format);
    StampSession::open_with_loader(&WebCatalogLoader, store, clock)
}

/// Create a session backed by `localStorage`.
///
/// A catalog that fails to load yields an empty passport rather than an error.
#[must_use]
pub fn create_web_session() -> WebSession {
    open_web_session(WebStore)
}
