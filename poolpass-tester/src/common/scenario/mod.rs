use anyhow::{Result, ensure};
use clap::ValueEnum;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use poolpass_engine::{
    Catalog, EngineConfig, FixedClock, MemoryStore, PersistentStore, StampSession,
    completion_badge,
};

use crate::common::temp_path;
use crate::storage::FileStore;

pub mod passport;
pub mod random_walk;
pub mod resilience;

pub type ScenarioSession = StampSession<Rc<dyn PersistentStore>, FixedClock>;

/// A scenario check; returns an error describing the first broken expectation.
pub type ScenarioCheck = fn(&ScenarioCtx) -> Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// In-process map
    Memory,
    /// One file per slot under a scratch directory removed after the run
    File,
}

/// Everything a single scenario iteration needs.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub catalog: Catalog,
    pub config: EngineConfig,
    pub store_kind: StoreKind,
    pub verbose: bool,
    scratch: PathBuf,
    stores_opened: Cell<usize>,
}

impl ScenarioCtx {
    pub fn new(
        seed: u64,
        catalog: Catalog,
        config: EngineConfig,
        store_kind: StoreKind,
        verbose: bool,
    ) -> Self {
        Self {
            seed,
            catalog,
            config,
            store_kind,
            verbose,
            scratch: temp_path(&format!("scenario-{seed}")),
            stores_opened: Cell::new(0),
        }
    }

    /// Directory holding every file store this iteration opens.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch
    }

    pub fn fresh_store(&self) -> Rc<dyn PersistentStore> {
        match self.store_kind {
            StoreKind::Memory => Rc::new(MemoryStore::new()),
            StoreKind::File => {
                let n = self.stores_opened.get();
                self.stores_opened.set(n + 1);
                Rc::new(FileStore::new(self.scratch.join(format!("store-{n}"))))
            }
        }
    }

    /// Remove the scratch directory, if any store created it.
    pub fn cleanup(&self) {
        if !self.scratch.exists() {
            return;
        }
        if let Err(err) = std::fs::remove_dir_all(&self.scratch) {
            log::warn!(
                "Could not remove scenario scratch dir {}: {err}",
                self.scratch.display()
            );
        }
    }

    pub fn open(&self, store: &Rc<dyn PersistentStore>, clock: &FixedClock) -> ScenarioSession {
        StampSession::open(
            Rc::clone(store),
            clock.clone(),
            self.catalog.clone(),
            self.config.clone(),
        )
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    pub fn require_locations(&self, min: usize) -> Result<()> {
        ensure!(
            self.catalog.len() >= min,
            "scenario needs at least {min} locations, catalog has {}",
            self.catalog.len()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub check: ScenarioCheck,
}

impl TestScenario {
    /// # Errors
    ///
    /// Returns the scenario's failure, if any.
    pub fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let outcome = (self.check)(ctx);
        ctx.cleanup();
        outcome
    }
}

const SCENARIOS: &[TestScenario] = &[
    TestScenario {
        key: "smoke",
        name: "Smoke Test",
        description: "Claim the selected pool, check the badge and reload",
        check: passport::smoke,
    },
    TestScenario {
        key: "idempotence",
        name: "Claim Idempotence",
        description: "Repeated claims keep the first date and write nothing",
        check: passport::idempotence,
    },
    TestScenario {
        key: "wraparound",
        name: "Selection Wraparound",
        description: "Browsing past either end wraps around the catalog",
        check: passport::wraparound,
    },
    TestScenario {
        key: "reset",
        name: "Passport Reset",
        description: "Reset clears every stamp and returns to the first page",
        check: passport::reset,
    },
    TestScenario {
        key: "pagination-bounds",
        name: "Pagination Bounds",
        description: "Pages saturate at both ends and partition the stamps",
        check: passport::pagination_bounds,
    },
    TestScenario {
        key: "date-order",
        name: "Chronological Order",
        description: "Stamps in mixed date formats list oldest first",
        check: passport::date_order,
    },
    TestScenario {
        key: "round-trip",
        name: "Reload Round Trip",
        description: "A reopened passport projects exactly what was saved",
        check: passport::round_trip,
    },
    TestScenario {
        key: "corrupt-storage",
        name: "Corrupt Storage",
        description: "Garbage in any slot falls back to defaults",
        check: resilience::corrupt_storage,
    },
    TestScenario {
        key: "write-failure",
        name: "Write Failure",
        description: "Failed writes surface and persist_all recovers them",
        check: resilience::write_failure,
    },
    TestScenario {
        key: "random-walk",
        name: "Random Walk",
        description: "Seeded operation walks keep every invariant",
        check: random_walk::random_walk,
    },
];

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    SCENARIOS.iter().find(|scenario| scenario.key == key).copied()
}

pub fn all_scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|scenario| scenario.key.to_string()).collect()
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

/// Checks that must hold after any sequence of operations.
pub fn check_invariants(session: &ScenarioSession) -> Result<()> {
    let projection = session.projection();
    let total = session.catalog().len();

    ensure!(
        total == 0 || projection.selected_index < total,
        "selected index {} out of range for {total} locations",
        projection.selected_index
    );
    ensure!(
        projection.page < projection.page_count,
        "page {} out of range for {} pages",
        projection.page,
        projection.page_count
    );
    ensure!(
        projection.stamps.len() <= session.config().page_size,
        "page shows {} stamps, page size is {}",
        projection.stamps.len(),
        session.config().page_size
    );
    ensure!(
        projection.visited == session.visited_count(),
        "projection counts {} visits, ledger has {}",
        projection.visited,
        session.visited_count()
    );
    ensure!(
        projection.visited <= total,
        "{} visits counted for {total} locations",
        projection.visited
    );
    ensure!(
        projection.badge == completion_badge(projection.visited, total),
        "badge '{}' does not match {}/{total}",
        projection.badge,
        projection.visited
    );
    ensure!(
        projection.completed == session.completion_reached(),
        "completion flag disagrees with the ledger"
    );

    let keys: Vec<String> = session
        .visible_stamps()
        .into_iter()
        .map(|entry| entry.date.sort_key)
        .collect();
    ensure!(
        keys.windows(2).all(|pair| pair[0] <= pair[1]),
        "visible stamps out of order: {keys:?}"
    );
    Ok(())
}
