//! Pool Passport Engine
//!
//! Platform-agnostic visit tracking for the Pool Passport stamp book.
//! This crate owns the visited ledger, the selection and page cursors, their
//! persistence, and every value the views derive from them. It has no UI or
//! platform-specific dependencies.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod constants;
pub mod dates;
pub mod ledger;
pub mod pagination;
pub mod projection;
pub mod selection;
pub mod session;
pub mod store;

use std::cell::RefCell;
use std::rc::Rc;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, Location};
pub use codec::{StateCodec, StorageKeys, decode_index, decode_ledger, encode_ledger};
pub use config::EngineConfig;
pub use constants::{DEFAULT_KEY_PREFIX, DEFAULT_PAGE_SIZE, ENGINE_CONFIG_NAME};
pub use dates::{DateForm, DateStyle, StampDate, display_date, normalize_date_key};
pub use ledger::{Claim, VisitLedger, VisitRecord};
pub use pagination::{
    PageCursor, StampEntry, advance_page, clamp_page, page_count, retreat_page, sorted_stamps,
    visible_slice,
};
pub use projection::{
    LocationView, PageNav, StampView, ViewProjection, completion_badge, page_label,
};
pub use selection::SelectionCursor;
pub use session::StampSession;
pub use store::{MemoryStore, StoreError};

/// Source of the location catalog and named config documents.
///
/// The web crate reads embedded assets; the tester reads files.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ordered list of stampable locations
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_locations(&self) -> Result<Catalog, Self::Error>;

    /// Load a named configuration document
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Device-local string key/value store holding the passport slots.
pub trait PersistentStore {
    /// Read a slot; `Ok(None)` when it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be stored.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T> PersistentStore for Rc<T>
where
    T: PersistentStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<T> PersistentStore for &T
where
    T: PersistentStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Source of "today" as an already-formatted date string.
pub trait Clock {
    fn today(&self) -> String;
}

impl<F> Clock for F
where
    F: Fn() -> String,
{
    fn today(&self) -> String {
        self()
    }
}

/// Clock pinned to a settable date. Clones share the same date.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    today: Rc<RefCell<String>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(today: impl Into<String>) -> Self {
        Self {
            today: Rc::new(RefCell::new(today.into())),
        }
    }

    pub fn set(&self, today: impl Into<String>) {
        *self.today.borrow_mut() = today.into();
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.today.borrow().clone()
    }
}
