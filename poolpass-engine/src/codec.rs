//! Conversion between engine state and the store's string slots.
//!
//! Reads never fail: a missing, unreadable or malformed slot yields the
//! default for that piece of state. Writes surface store errors unchanged.
use serde_json::Value;
use std::collections::BTreeMap;

use crate::PersistentStore;
use crate::constants::{
    DEFAULT_KEY_PREFIX, KEY_SUFFIX_SELECTED, KEY_SUFFIX_STAMP_PAGE, KEY_SUFFIX_VISITED,
};
use crate::ledger::{VisitLedger, VisitRecord};
use crate::store::StoreError;

/// Names of the three persisted slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub visited: String,
    pub selected: String,
    pub stamp_page: String,
}

impl StorageKeys {
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let join = |suffix: &str| {
            if prefix.is_empty() {
                suffix.to_string()
            } else {
                format!("{prefix}.{suffix}")
            }
        };
        Self {
            visited: join(KEY_SUFFIX_VISITED),
            selected: join(KEY_SUFFIX_SELECTED),
            stamp_page: join(KEY_SUFFIX_STAMP_PAGE),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Encode the ledger as a JSON object keyed by location id.
#[must_use]
pub fn encode_ledger(ledger: &VisitLedger) -> String {
    serde_json::to_string(ledger).unwrap_or_else(|_| "{}".to_string())
}

/// Decode a ledger payload, keeping every entry that can be understood.
///
/// Accepted entry shapes: `{done, date}` (either field may be missing) and a
/// bare `true` from early saves. Anything else is dropped on its own; a
/// payload that is not a JSON object yields an empty ledger.
#[must_use]
pub fn decode_ledger(payload: &str) -> VisitLedger {
    let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(payload) else {
        log::warn!("Discarding unreadable visit ledger payload");
        return VisitLedger::new();
    };
    let mut records = BTreeMap::new();
    for (id, entry) in entries {
        match decode_record(entry) {
            Some(record) => {
                records.insert(id, record);
            }
            None => log::warn!("Dropping malformed visit record for {id}"),
        }
    }
    VisitLedger::from_records(records)
}

fn decode_record(entry: Value) -> Option<VisitRecord> {
    match entry {
        Value::Bool(true) => Some(VisitRecord::stamped("")),
        Value::Object(mut fields) => {
            // Dates have only ever been strings; anything else is treated as absent.
            if fields.get("date").is_some_and(|date| !date.is_string()) {
                fields.remove("date");
            }
            serde_json::from_value(Value::Object(fields)).ok()
        }
        _ => None,
    }
}

/// Decode an integer slot. Accepts a JSON number or a quoted integer.
#[must_use]
pub fn decode_index(payload: &str) -> Option<i64> {
    match serde_json::from_str::<Value>(payload).ok()? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Reads and writes engine state through a [`PersistentStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateCodec {
    keys: StorageKeys,
}

impl StateCodec {
    #[must_use]
    pub const fn new(keys: StorageKeys) -> Self {
        Self { keys }
    }

    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self::new(StorageKeys::with_prefix(prefix))
    }

    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn read<S: PersistentStore + ?Sized>(store: &S, key: &str) -> Option<String> {
        match store.get(key) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Treating {key} as absent: {err}");
                None
            }
        }
    }

    pub fn load_ledger<S: PersistentStore + ?Sized>(&self, store: &S) -> VisitLedger {
        Self::read(store, &self.keys.visited)
            .map(|payload| decode_ledger(&payload))
            .unwrap_or_default()
    }

    pub fn load_selection<S: PersistentStore + ?Sized>(&self, store: &S) -> Option<i64> {
        Self::read(store, &self.keys.selected).and_then(|payload| decode_index(&payload))
    }

    pub fn load_page<S: PersistentStore + ?Sized>(&self, store: &S) -> Option<i64> {
        Self::read(store, &self.keys.stamp_page).and_then(|payload| decode_index(&payload))
    }

    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub fn save_ledger<S: PersistentStore + ?Sized>(
        &self,
        store: &S,
        ledger: &VisitLedger,
    ) -> Result<(), StoreError> {
        store.set(&self.keys.visited, &encode_ledger(ledger))
    }

    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub fn save_selection<S: PersistentStore + ?Sized>(
        &self,
        store: &S,
        index: usize,
    ) -> Result<(), StoreError> {
        store.set(&self.keys.selected, &index.to_string())
    }

    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub fn save_page<S: PersistentStore + ?Sized>(
        &self,
        store: &S,
        page: usize,
    ) -> Result<(), StoreError> {
        store.set(&self.keys.stamp_page, &page.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn keys_follow_prefix() {
        let keys = StorageKeys::default();
        assert_eq!(keys.visited, "poolpass.visited");
        assert_eq!(keys.selected, "poolpass.selected");
        assert_eq!(keys.stamp_page, "poolpass.stampPage");
        assert_eq!(StorageKeys::with_prefix("").visited, "visited");
    }

    #[test]
    fn mixed_format_ledger_round_trips() {
        let mut ledger = VisitLedger::new();
        ledger.claim("a", "01/01/2025");
        ledger.claim("b", "2025-01-02");
        ledger.claim("c", "3/1/2025");
        ledger.claim("d", "Jan 4 2025");
        ledger.claim("e", "");

        let decoded = decode_ledger(&encode_ledger(&ledger));
        assert_eq!(decoded, ledger);
        assert_eq!(decoded.count(), 5);
    }

    #[test]
    fn legacy_entries_still_count_as_visited() {
        let ledger = decode_ledger(
            r#"{"a":{"done":true},"b":{"done":true,"date":"2024-06-01"},"c":true,"d":{"done":true,"date":17}}"#,
        );
        for id in ["a", "b", "c", "d"] {
            assert!(ledger.is_visited(id), "{id} should be visited");
        }
        assert_eq!(ledger.get("a").map(|r| r.date.as_str()), Some(""));
        assert_eq!(ledger.get("d").map(|r| r.date.as_str()), Some(""));
    }

    #[test]
    fn malformed_entries_are_dropped_individually() {
        let ledger = decode_ledger(r#"{"a":{"done":true,"date":"01/01/2025"},"b":"yes","c":[1],"d":{"done":"sure"}}"#);
        assert!(ledger.is_visited("a"));
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn corrupt_payloads_become_defaults() {
        assert!(decode_ledger("{oops").is_empty());
        assert!(decode_ledger("[1,2,3]").is_empty());
        assert!(decode_ledger("null").is_empty());
        assert_eq!(decode_index("3"), Some(3));
        assert_eq!(decode_index("\" 4 \""), Some(4));
        assert_eq!(decode_index("-2"), Some(-2));
        assert_eq!(decode_index("1.5"), None);
        assert_eq!(decode_index("banana"), None);
    }

    #[test]
    fn codec_reads_defaults_from_empty_store() {
        let store = MemoryStore::new();
        let codec = StateCodec::default();
        assert!(codec.load_ledger(&store).is_empty());
        assert_eq!(codec.load_selection(&store), None);
        assert_eq!(codec.load_page(&store), None);
    }

    #[test]
    fn codec_writes_each_slot() {
        let store = MemoryStore::new();
        let codec = StateCodec::with_prefix("test");
        let mut ledger = VisitLedger::new();
        ledger.claim("a", "01/01/2025");
        codec.save_ledger(&store, &ledger).unwrap();
        codec.save_selection(&store, 2).unwrap();
        codec.save_page(&store, 1).unwrap();

        assert_eq!(
            store.raw("test.visited").as_deref(),
            Some(r#"{"a":{"done":true,"date":"01/01/2025"}}"#)
        );
        assert_eq!(codec.load_selection(&store), Some(2));
        assert_eq!(codec.load_page(&store), Some(1));
        assert_eq!(codec.load_ledger(&store), ledger);
    }
}
