//! Catalog, config and clock sources for the command-line passport.
use std::fs;
use std::path::{Path, PathBuf};

use poolpass_engine::{Catalog, CatalogError, CatalogLoader, Clock, DateStyle, ENGINE_CONFIG_NAME};
use serde::de::DeserializeOwned;

const POOLS_FILE: &str = "pools.json";
const ENGINE_FILE: &str = "engine.json";

/// Data directory of the web build, read when no file is given.
#[must_use]
pub fn assets_data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("poolpass-web")
        .join("static")
        .join("data")
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unknown config: {0}")]
    UnknownConfig(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Loads the catalog and engine config from files, falling back to the
/// web build's data directory.
#[derive(Debug, Clone, Default)]
pub struct FileCatalogLoader {
    pub catalog_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

impl FileCatalogLoader {
    #[must_use]
    pub const fn new(catalog_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            catalog_path,
            config_path,
        }
    }

    fn read(path: Option<&PathBuf>, default_file: &str) -> Result<String, AssetError> {
        let path = path.map_or_else(|| assets_data_root().join(default_file), PathBuf::clone);
        read_file(&path)
    }
}

impl CatalogLoader for FileCatalogLoader {
    type Error = AssetError;

    fn load_locations(&self) -> Result<Catalog, Self::Error> {
        let json = Self::read(self.catalog_path.as_ref(), POOLS_FILE)?;
        Ok(Catalog::from_json(&json)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        if config_name != ENGINE_CONFIG_NAME {
            return Err(AssetError::UnknownConfig(config_name.to_string()));
        }
        let json = Self::read(self.config_path.as_ref(), ENGINE_FILE)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn read_file(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Today's local date from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    style: DateStyle,
}

impl SystemClock {
    #[must_use]
    pub const fn new(style: DateStyle) -> Self {
        Self { style }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> String {
        use chrono::Datelike;
        let now = chrono::Local::now().date_naive();
        self.style.format(now.year(), now.month(), now.day())
    }
}
