//! Read-only values handed to presentation after every operation.
use serde::Serialize;

use crate::catalog::{Catalog, Location};
use crate::dates::display_date;
use crate::ledger::VisitLedger;
use crate::pagination::{clamp_page, page_count, visible_slice};

/// `"{visited} / {total}"`
#[must_use]
pub fn completion_badge(visited: usize, total: usize) -> String {
    format!("{visited} / {total}")
}

/// `"Page {page + 1} of {pages}"`
#[must_use]
pub fn page_label(page: usize, pages: usize) -> String {
    format!("Page {} of {pages}", page + 1)
}

/// Enablement of the page navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageNav {
    pub can_retreat: bool,
    pub can_advance: bool,
}

impl PageNav {
    #[must_use]
    pub const fn for_page(page: usize, pages: usize) -> Self {
        Self {
            can_retreat: page > 0,
            can_advance: page + 1 < pages,
        }
    }
}

/// One location as the list/map view shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub stamped: bool,
    pub selected: bool,
    /// Claim date as `DD/MM/YYYY`, present once stamped.
    pub date: Option<String>,
    pub stamp_image: Option<String>,
}

impl LocationView {
    #[must_use]
    pub fn from_location(location: &Location, ledger: &VisitLedger, selected: bool) -> Self {
        let record = ledger.get(&location.id).filter(|record| record.done);
        Self {
            id: location.id.clone(),
            name: location.name.clone(),
            lat: location.lat,
            lng: location.lng,
            stamped: record.is_some(),
            selected,
            date: record.map(|record| display_date(&record.date)),
            stamp_image: location.stamp_image.clone(),
        }
    }
}

/// One cell of the stamps summary page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampView {
    pub id: String,
    pub name: String,
    pub date: String,
    pub stamp_image: Option<String>,
}

/// Everything both views need, derived in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewProjection {
    pub visited: usize,
    pub total: usize,
    pub badge: String,
    pub completed: bool,
    pub selected_index: usize,
    pub selected: Option<LocationView>,
    pub locations: Vec<LocationView>,
    pub page: usize,
    pub page_count: usize,
    pub page_label: String,
    pub nav: PageNav,
    pub stamps: Vec<StampView>,
}

impl ViewProjection {
    /// Derive the projection. `page` is clamped, `selected_index` is assumed
    /// already clamped by the selection cursor.
    #[must_use]
    pub fn derive(
        catalog: &Catalog,
        ledger: &VisitLedger,
        selected_index: usize,
        page: usize,
        page_size: usize,
    ) -> Self {
        let visited = ledger.count_in(catalog);
        let total = catalog.len();
        let pages = page_count(visited, page_size);
        let page = clamp_page(page, visited, page_size);

        let locations: Vec<LocationView> = catalog
            .iter()
            .enumerate()
            .map(|(index, location)| {
                LocationView::from_location(location, ledger, index == selected_index)
            })
            .collect();
        let selected = locations.get(selected_index).cloned();

        let stamps = visible_slice(ledger, catalog, page, page_size)
            .into_iter()
            .map(|entry| StampView {
                id: entry.location.id.clone(),
                name: entry.location.name.clone(),
                date: entry.date.display,
                stamp_image: entry.location.stamp_image.clone(),
            })
            .collect();

        Self {
            visited,
            total,
            badge: completion_badge(visited, total),
            completed: ledger.completion_reached(catalog),
            selected_index,
            selected,
            locations,
            page,
            page_count: pages,
            page_label: page_label(page, pages),
            nav: PageNav::for_page(page, pages),
            stamps,
        }
    }
}
