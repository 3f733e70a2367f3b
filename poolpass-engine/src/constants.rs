//! Centralized defaults for the visit tracking engine.
//!
//! Storage key suffixes are part of the persisted layout. Changing one
//! orphans every passport already saved on a device.

// Storage layout -------------------------------------------------------------
pub const DEFAULT_KEY_PREFIX: &str = "poolpass";
pub(crate) const KEY_SUFFIX_VISITED: &str = "visited";
pub(crate) const KEY_SUFFIX_SELECTED: &str = "selected";
pub(crate) const KEY_SUFFIX_STAMP_PAGE: &str = "stampPage";

// Pagination -----------------------------------------------------------------
pub const DEFAULT_PAGE_SIZE: usize = 2;
pub(crate) const MIN_PAGE_SIZE: usize = 1;

// Loader config names --------------------------------------------------------
pub const ENGINE_CONFIG_NAME: &str = "engine";
