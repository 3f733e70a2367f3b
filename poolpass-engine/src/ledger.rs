//! Visit ledger: which pools have been stamped, and when.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::dates::StampDate;

/// Proof that a location was claimed.
///
/// `date` is the clock's formatted string at claim time. Legacy saves may
/// omit it entirely; such records still count as visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub date: String,
}

impl VisitRecord {
    #[must_use]
    pub fn stamped(date: impl Into<String>) -> Self {
        Self {
            done: true,
            date: date.into(),
        }
    }

    /// Parsed view of the claim date.
    #[must_use]
    pub fn stamp_date(&self) -> StampDate {
        StampDate::parse(&self.date)
    }
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// A new record was written.
    Stamped(VisitRecord),
    /// The location was already visited; nothing changed.
    AlreadyStamped(VisitRecord),
    /// The id is not part of the catalog; nothing changed.
    UnknownLocation,
}

impl Claim {
    #[must_use]
    pub const fn record(&self) -> Option<&VisitRecord> {
        match self {
            Self::Stamped(record) | Self::AlreadyStamped(record) => Some(record),
            Self::UnknownLocation => None,
        }
    }

    /// Whether this claim changed the ledger.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        matches!(self, Self::Stamped(_))
    }
}

/// Mapping from location id to visit record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitLedger {
    records: BTreeMap<String, VisitRecord>,
}

impl VisitLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn from_records(records: BTreeMap<String, VisitRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn is_visited(&self, id: &str) -> bool {
        self.records.get(id).is_some_and(|record| record.done)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VisitRecord> {
        self.records.get(id)
    }

    /// Stamp `id` with `today` unless it is already visited.
    ///
    /// Stamping is one-way: an existing visited record is returned untouched
    /// no matter what `today` says.
    pub fn claim(&mut self, id: &str, today: &str) -> Claim {
        if let Some(existing) = self.records.get(id).filter(|record| record.done) {
            return Claim::AlreadyStamped(existing.clone());
        }
        let record = VisitRecord::stamped(today);
        self.records.insert(id.to_string(), record.clone());
        Claim::Stamped(record)
    }

    /// Forget every record. The only way to un-claim anything.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Number of visited records, including ids no catalog knows about.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.values().filter(|record| record.done).count()
    }

    /// Visited records whose id is part of `catalog`.
    ///
    /// Stale ids left behind by a shrunken catalog are kept in storage but
    /// never counted here.
    #[must_use]
    pub fn count_in(&self, catalog: &Catalog) -> usize {
        catalog
            .iter()
            .filter(|location| self.is_visited(&location.id))
            .count()
    }

    /// True once every location of a non-empty catalog has been stamped.
    #[must_use]
    pub fn completion_reached(&self, catalog: &Catalog) -> bool {
        !catalog.is_empty() && self.count_in(catalog) == catalog.len()
    }

    /// Iterate all stored records, visited or not, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VisitRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn records(&self) -> &BTreeMap<String, VisitRecord> {
        &self.records
    }
}
