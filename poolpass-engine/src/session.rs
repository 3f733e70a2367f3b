//! Stamp session: the state object a UI owns for the lifetime of a page.
//!
//! Each mutating call updates memory first, then writes the affected slots
//! before returning. On a write failure the in-memory state is already
//! updated; [`StampSession::persist_all`] retries the writes.
use crate::catalog::{Catalog, Location};
use crate::codec::StateCodec;
use crate::config::EngineConfig;
use crate::constants::ENGINE_CONFIG_NAME;
use crate::ledger::{Claim, VisitLedger};
use crate::pagination::{PageCursor, StampEntry};
use crate::projection::ViewProjection;
use crate::selection::SelectionCursor;
use crate::store::StoreError;
use crate::{CatalogLoader, Clock, PersistentStore};

#[derive(Debug)]
pub struct StampSession<S, C>
where
    S: PersistentStore,
    C: Clock,
{
    store: S,
    clock: C,
    codec: StateCodec,
    config: EngineConfig,
    catalog: Catalog,
    ledger: VisitLedger,
    selection: SelectionCursor,
    pager: PageCursor,
    revision: u64,
}

impl<S, C> StampSession<S, C>
where
    S: PersistentStore,
    C: Clock,
{
    /// Rehydrate a session from the store. Corrupt or missing slots fall
    /// back to an empty ledger and zeroed cursors.
    pub fn open(store: S, clock: C, catalog: Catalog, config: EngineConfig) -> Self {
        let config = config.normalized();
        let codec = StateCodec::new(config.storage_keys());
        let ledger = codec.load_ledger(&store);

        let mut selection = SelectionCursor::new();
        selection.set_from_persisted(codec.load_selection(&store), catalog.len());
        let visited = ledger.count_in(&catalog);
        let mut pager = PageCursor::new(config.page_size);
        pager.set_from_persisted(codec.load_page(&store), visited);

        let stale = ledger.count().saturating_sub(visited);
        if stale > 0 {
            log::debug!("{stale} stamped ids are not in the catalog and will not be shown");
        }
        log::debug!(
            "Opened passport: {} locations, {visited} stamped",
            catalog.len()
        );
        Self {
            store,
            clock,
            codec,
            config,
            catalog,
            ledger,
            selection,
            pager,
            revision: 0,
        }
    }

    /// Open using a loader for the catalog and config. A failing catalog
    /// load yields an empty catalog; a failing config load yields defaults.
    pub fn open_with_loader<L: CatalogLoader>(loader: &L, store: S, clock: C) -> Self {
        let catalog = loader.load_locations().unwrap_or_else(|err| {
            log::warn!("Catalog load failed, continuing with no locations: {err}");
            Catalog::empty()
        });
        let config = loader
            .load_config::<EngineConfig>(ENGINE_CONFIG_NAME)
            .unwrap_or_else(|err| {
                log::warn!("Engine config load failed, using defaults: {err}");
                EngineConfig::default()
            });
        Self::open(store, clock, catalog, config)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Clamp the page against the ledger and persist it if it moved.
    fn settle_page(&mut self) -> Result<(), StoreError> {
        let visited = self.visited_count();
        if self.pager.clamp(visited) {
            self.codec
                .save_page(&self.store, self.pager.current(visited))?;
        }
        Ok(())
    }

    /// Stamp a location with today's date.
    ///
    /// Unknown ids and already-stamped locations leave the ledger untouched
    /// and write nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be persisted.
    pub fn claim(&mut self, id: &str) -> Result<Claim, StoreError> {
        if !self.catalog.contains(id) {
            log::debug!("Ignoring claim for unknown location {id}");
            return Ok(Claim::UnknownLocation);
        }
        let today = self.clock.today();
        let claim = self.ledger.claim(id, &today);
        if claim.is_new() {
            self.bump();
            log::debug!("Stamped {id} on {today}");
            self.codec.save_ledger(&self.store, &self.ledger)?;
            self.settle_page()?;
        }
        Ok(claim)
    }

    /// Stamp whichever location is currently selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be persisted.
    pub fn claim_selected(&mut self) -> Result<Claim, StoreError> {
        let Some(id) = self.selected_location().map(|location| location.id.clone()) else {
            return Ok(Claim::UnknownLocation);
        };
        self.claim(&id)
    }

    /// Clear every stamp and return to the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger or page cannot be persisted.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.ledger.reset();
        self.pager.clamp(0);
        self.bump();
        log::debug!("Passport reset");
        self.codec.save_ledger(&self.store, &self.ledger)?;
        self.codec.save_page(&self.store, self.pager.current(0))
    }

    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub fn next_location(&mut self) -> Result<usize, StoreError> {
        let len = self.catalog.len();
        if len == 0 {
            return Ok(0);
        }
        let index = self.selection.next(len);
        self.bump();
        self.codec.save_selection(&self.store, index)?;
        Ok(index)
    }

    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub fn previous_location(&mut self) -> Result<usize, StoreError> {
        let len = self.catalog.len();
        if len == 0 {
            return Ok(0);
        }
        let index = self.selection.previous(len);
        self.bump();
        self.codec.save_selection(&self.store, index)?;
        Ok(index)
    }

    /// Move the selection to the location with `id`, e.g. after a marker
    /// click. Unknown ids change nothing and return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub fn select(&mut self, id: &str) -> Result<Option<usize>, StoreError> {
        let Some(target) = self.catalog.index_of(id) else {
            return Ok(None);
        };
        let index = self.selection.select(target, self.catalog.len());
        self.bump();
        self.codec.save_selection(&self.store, index)?;
        Ok(Some(index))
    }

    /// # Errors
    ///
    /// Returns an error if the page cannot be persisted.
    pub fn next_page(&mut self) -> Result<usize, StoreError> {
        let visited = self.visited_count();
        let before = self.pager.current(visited);
        let page = self.pager.advance(visited);
        if page != before {
            self.bump();
            self.codec.save_page(&self.store, page)?;
        }
        Ok(page)
    }

    /// # Errors
    ///
    /// Returns an error if the page cannot be persisted.
    pub fn previous_page(&mut self) -> Result<usize, StoreError> {
        let visited = self.visited_count();
        let before = self.pager.current(visited);
        let page = self.pager.retreat(visited);
        if page != before {
            self.bump();
            self.codec.save_page(&self.store, page)?;
        }
        Ok(page)
    }

    /// Write all three slots from memory.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered.
    pub fn persist_all(&self) -> Result<(), StoreError> {
        self.codec.save_ledger(&self.store, &self.ledger)?;
        self.codec
            .save_selection(&self.store, self.selected_index())?;
        self.codec.save_page(&self.store, self.page())
    }

    #[must_use]
    pub fn projection(&self) -> ViewProjection {
        ViewProjection::derive(
            &self.catalog,
            &self.ledger,
            self.selected_index(),
            self.page(),
            self.pager.page_size(),
        )
    }

    /// Stamps on the current page, oldest first.
    #[must_use]
    pub fn visible_stamps(&self) -> Vec<StampEntry<'_>> {
        self.pager.visible(&self.ledger, &self.catalog)
    }

    #[must_use]
    pub fn is_visited(&self, id: &str) -> bool {
        self.ledger.is_visited(id)
    }

    /// Stamped locations in the current catalog.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.ledger.count_in(&self.catalog)
    }

    #[must_use]
    pub fn completion_reached(&self) -> bool {
        self.ledger.completion_reached(&self.catalog)
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selection.current(self.catalog.len())
    }

    #[must_use]
    pub fn selected_location(&self) -> Option<&Location> {
        self.catalog.get(self.selected_index())
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.pager.current(self.visited_count())
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.visited_count())
    }

    /// Incremented on every state change; presentation can poll it to
    /// decide whether to re-render.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn ledger(&self) -> &VisitLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consume the session, returning the store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use crate::catalog::CatalogError;
    use crate::store::MemoryStore;
    use serde::de::DeserializeOwned;

    fn abc() -> Catalog {
        Catalog::new(vec![
            Location::new("a", "A", 0.0, 0.0),
            Location::new("b", "B", 0.0, 0.0),
            Location::new("c", "C", 0.0, 0.0),
        ])
        .unwrap()
    }

    fn session(store: &MemoryStore, clock: &FixedClock) -> StampSession<MemoryStore, FixedClock> {
        StampSession::open(store.clone(), clock.clone(), abc(), EngineConfig::default())
    }

    #[test]
    fn unknown_claim_writes_nothing() {
        let store = MemoryStore::new();
        let mut session = session(&store, &FixedClock::new("01/01/2025"));
        assert_eq!(session.claim("zzz").unwrap(), Claim::UnknownLocation);
        assert!(store.is_empty());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn claim_persists_before_returning() {
        let store = MemoryStore::new();
        let clock = FixedClock::new("02/01/2025");
        let mut session = session(&store, &clock);
        assert!(session.claim("b").unwrap().is_new());
        assert_eq!(
            store.raw("poolpass.visited").as_deref(),
            Some(r#"{"b":{"done":true,"date":"02/01/2025"}}"#)
        );
        let before = store.raw("poolpass.visited");
        clock.set("09/09/2025");
        assert!(!session.claim("b").unwrap().is_new());
        assert_eq!(store.raw("poolpass.visited"), before);
    }

    #[test]
    fn write_failure_surfaces_but_memory_keeps_change() {
        let store = MemoryStore::new();
        let mut session = session(&store, &FixedClock::new("01/01/2025"));
        store.set_fail_writes(true);
        let err = session.claim("a").expect_err("write should fail");
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(session.is_visited("a"));
        assert!(store.raw("poolpass.visited").is_none());

        store.set_fail_writes(false);
        session.persist_all().unwrap();
        let reopened = StampSession::open(
            store.clone(),
            FixedClock::new("x"),
            abc(),
            EngineConfig::default(),
        );
        assert!(reopened.is_visited("a"));
    }

    #[test]
    fn reset_returns_to_first_page() {
        let store = MemoryStore::new();
        let clock = FixedClock::new("01/01/2025");
        let mut session = session(&store, &clock);
        for id in ["a", "b", "c"] {
            session.claim(id).unwrap();
        }
        assert_eq!(session.next_page().unwrap(), 1);
        session.reset().unwrap();
        assert_eq!(session.visited_count(), 0);
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.page(), 0);
        assert_eq!(store.raw("poolpass.stampPage").as_deref(), Some("0"));
        assert_eq!(store.raw("poolpass.visited").as_deref(), Some("{}"));
    }

    #[test]
    fn select_by_id_and_claim_selected() {
        let store = MemoryStore::new();
        let mut session = session(&store, &FixedClock::new("05/05/2025"));
        assert_eq!(session.select("c").unwrap(), Some(2));
        assert_eq!(session.select("nope").unwrap(), None);
        assert_eq!(store.raw("poolpass.selected").as_deref(), Some("2"));
        assert!(session.claim_selected().unwrap().is_new());
        assert!(session.is_visited("c"));
    }

    #[test]
    fn empty_catalog_degrades_to_zero() {
        let store = MemoryStore::new();
        let mut session = StampSession::open(
            store.clone(),
            FixedClock::new("01/01/2025"),
            Catalog::empty(),
            EngineConfig::default(),
        );
        assert_eq!(session.next_location().unwrap(), 0);
        assert_eq!(session.previous_location().unwrap(), 0);
        assert_eq!(session.next_page().unwrap(), 0);
        assert_eq!(session.claim_selected().unwrap(), Claim::UnknownLocation);
        assert!(!session.completion_reached());
        assert!(store.is_empty());
    }

    #[test]
    fn stale_ledger_ids_are_kept_but_not_counted() {
        let store = MemoryStore::with_slots([(
            "poolpass.visited",
            r#"{"gone1":{"done":true,"date":"01/01/2024"},"gone2":{"done":true,"date":"02/01/2024"},"a":{"done":true,"date":"03/01/2024"}}"#,
        )]);
        let clock = FixedClock::new("04/01/2024");
        let mut session = session(&store, &clock);

        assert_eq!(session.projection().badge, "1 / 3");
        assert!(!session.completion_reached());
        assert!(!session.is_visited("b"));
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.next_page().unwrap(), 0);
        assert_eq!(session.revision(), 0);

        assert!(session.claim("b").unwrap().is_new());
        assert_eq!(session.projection().badge, "2 / 3");
        assert!(!session.completion_reached());
        assert!(session.claim("c").unwrap().is_new());
        assert_eq!(session.projection().badge, "3 / 3");
        assert!(session.completion_reached());
        assert_eq!(session.page_count(), 2);
        assert_eq!(session.next_page().unwrap(), 1);
        let stamps: Vec<&str> = session
            .visible_stamps()
            .iter()
            .map(|entry| entry.location.id.as_str())
            .collect();
        assert_eq!(stamps, vec!["c"]);
        assert!(session.ledger().is_visited("gone1"));
    }

    struct BrokenLoader;

    impl CatalogLoader for BrokenLoader {
        type Error = CatalogError;

        fn load_locations(&self) -> Result<Catalog, Self::Error> {
            Err(CatalogError::Unavailable("offline".to_string()))
        }

        fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            Err(CatalogError::Unavailable(format!("no {config_name}")))
        }
    }

    #[test]
    fn failing_loader_yields_empty_catalog() {
        let store = MemoryStore::with_slots([("poolpass.selected", "4")]);
        let session =
            StampSession::open_with_loader(&BrokenLoader, store, FixedClock::new("01/01/2025"));
        assert!(session.catalog().is_empty());
        assert_eq!(session.selected_index(), 0);
        assert_eq!(session.config(), &EngineConfig::default());
        assert_eq!(session.store().get("poolpass.selected").unwrap().as_deref(), Some("4"));
    }
}
