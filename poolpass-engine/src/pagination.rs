//! Paginated, chronological view over stamped locations.
//!
//! Unlike the selection cursor, pages saturate at both ends: the last page
//! never wraps to the first.
use crate::catalog::{Catalog, Location};
use crate::constants::MIN_PAGE_SIZE;
use crate::dates::StampDate;
use crate::ledger::{VisitLedger, VisitRecord};

/// A stamped location paired with its record and parsed date.
#[derive(Debug, Clone, PartialEq)]
pub struct StampEntry<'a> {
    pub location: &'a Location,
    pub record: &'a VisitRecord,
    pub date: StampDate,
}

const fn effective_page_size(page_size: usize) -> usize {
    if page_size < MIN_PAGE_SIZE {
        MIN_PAGE_SIZE
    } else {
        page_size
    }
}

/// Every stamped catalog entry, oldest claim first.
///
/// Ties on the date key keep catalog order.
#[must_use]
pub fn sorted_stamps<'a>(ledger: &'a VisitLedger, catalog: &'a Catalog) -> Vec<StampEntry<'a>> {
    let mut entries: Vec<StampEntry<'a>> = catalog
        .iter()
        .filter_map(|location| {
            ledger
                .get(&location.id)
                .filter(|record| record.done)
                .map(|record| StampEntry {
                    location,
                    record,
                    date: record.stamp_date(),
                })
        })
        .collect();
    entries.sort_by(|a, b| a.date.sort_key.cmp(&b.date.sort_key));
    entries
}

/// Window `[page * page_size, page * page_size + page_size)` of the sorted stamps.
#[must_use]
pub fn visible_slice<'a>(
    ledger: &'a VisitLedger,
    catalog: &'a Catalog,
    page: usize,
    page_size: usize,
) -> Vec<StampEntry<'a>> {
    let size = effective_page_size(page_size);
    sorted_stamps(ledger, catalog)
        .into_iter()
        .skip(page.saturating_mul(size))
        .take(size)
        .collect()
}

/// `max(1, ceil(visited / page_size))`
#[must_use]
pub fn page_count(visited: usize, page_size: usize) -> usize {
    visited.div_ceil(effective_page_size(page_size)).max(1)
}

#[must_use]
pub fn clamp_page(page: usize, visited: usize, page_size: usize) -> usize {
    page.min(page_count(visited, page_size) - 1)
}

#[must_use]
pub fn advance_page(page: usize, visited: usize, page_size: usize) -> usize {
    clamp_page(page.saturating_add(1), visited, page_size)
}

#[must_use]
pub fn retreat_page(page: usize, visited: usize, page_size: usize) -> usize {
    clamp_page(page, visited, page_size).saturating_sub(1)
}

/// Current page of the stamps view.
///
/// `visited` arguments are the number of stamped catalog entries, i.e.
/// [`VisitLedger::count_in`], so stale ledger ids never add pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    page_size: usize,
}

impl PageCursor {
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: effective_page_size(page_size),
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// The stored page, clamped.
    #[must_use]
    pub fn current(&self, visited: usize) -> usize {
        clamp_page(self.page, visited, self.page_size)
    }

    /// Re-clamp after a ledger mutation. Returns true if the page moved.
    pub fn clamp(&mut self, visited: usize) -> bool {
        let clamped = self.current(visited);
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }

    pub fn advance(&mut self, visited: usize) -> usize {
        self.page = advance_page(self.page, visited, self.page_size);
        self.page
    }

    pub fn retreat(&mut self, visited: usize) -> usize {
        self.page = retreat_page(self.page, visited, self.page_size);
        self.page
    }

    /// Restore from a persisted slot; missing or negative values become `0`.
    pub fn set_from_persisted(&mut self, raw: Option<i64>, visited: usize) -> usize {
        self.page = raw
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(0);
        self.clamp(visited);
        self.page
    }

    #[must_use]
    pub fn page_count(&self, visited: usize) -> usize {
        page_count(visited, self.page_size)
    }

    #[must_use]
    pub fn visible<'a>(&self, ledger: &'a VisitLedger, catalog: &'a Catalog) -> Vec<StampEntry<'a>> {
        let visited = ledger.count_in(catalog);
        visible_slice(ledger, catalog, self.current(visited), self.page_size)
    }
}
