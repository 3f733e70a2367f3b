use anyhow::{Context, Result, ensure};
use std::rc::Rc;

use poolpass_engine::{FixedClock, MemoryStore, PersistentStore, StoreError};

use super::{ScenarioCtx, check_invariants};

const GARBAGE_LEDGERS: &[&str] = &["not json{", "[1,2,3]", "42", "null", "\"visited\"", ""];
const GARBAGE_INDICES: &[&str] = &["banana", "-3", "{}", "", "2.5"];

pub fn corrupt_storage(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let keys = ctx.config.clone().normalized().storage_keys();
    let clock = FixedClock::new("01/01/2025");

    for (ledger, index) in GARBAGE_LEDGERS.iter().zip(GARBAGE_INDICES.iter().cycle()) {
        let store = ctx.fresh_store();
        store.set(&keys.visited, ledger)?;
        store.set(&keys.selected, index)?;
        store.set(&keys.stamp_page, index)?;

        let mut session = ctx.open(&store, &clock);
        ensure!(session.visited_count() == 0, "ledger {ledger:?} should decode empty");
        ensure!(session.selected_index() == 0, "selection {index:?} should default to 0");
        ensure!(session.page() == 0, "page {index:?} should default to 0");
        check_invariants(&session)?;

        let first = ctx.catalog.get(0).map(|l| l.id.clone()).context("empty catalog")?;
        ensure!(session.claim(&first)?.is_new(), "claim after corruption should stamp");
        let reopened = ctx.open(&store, &clock);
        ensure!(reopened.is_visited(&first), "claim after corruption was not saved");
    }

    // Out-of-range indices clamp; partially valid ledgers keep the good entries.
    let total = ctx.catalog.len();
    let first = ctx.catalog.get(0).map(|l| l.id.clone()).context("empty catalog")?;
    let store = ctx.fresh_store();
    store.set(
        &keys.visited,
        &format!(r#"{{"{first}":true,"ghost":"junk","also":{{"done":"yes"}}}}"#),
    )?;
    store.set(&keys.selected, &(total + 5).to_string())?;
    store.set(&keys.stamp_page, "99")?;

    let session = ctx.open(&store, &clock);
    ensure!(session.is_visited(&first), "legacy boolean entry should count as visited");
    ensure!(session.visited_count() == 1, "malformed entries should be dropped");
    ensure!(session.selected_index() == 0, "out-of-range selection should reset");
    ensure!(session.page() == 0, "out-of-range page should clamp");
    check_invariants(&session)
}

pub fn write_failure(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(2)?;
    let memory = MemoryStore::new();
    let store: Rc<dyn PersistentStore> = Rc::new(memory.clone());
    let clock = FixedClock::new("09/09/2025");
    let mut session = ctx.open(&store, &clock);
    let keys = session.config().storage_keys();
    let first = ctx.catalog.get(0).map(|l| l.id.clone()).context("empty catalog")?;

    memory.set_fail_writes(true);
    let err = match session.claim(&first) {
        Err(err) => err,
        Ok(claim) => anyhow::bail!("claim should fail while writes fail, got {claim:?}"),
    };
    ensure!(matches!(err, StoreError::Write { .. }), "unexpected error {err}");
    ensure!(session.is_visited(&first), "memory should keep the stamp");
    ensure!(memory.raw(&keys.visited).is_none(), "nothing should be written");
    ensure!(session.next_location().is_err(), "selection write should fail too");
    ensure!(session.selected_index() == 1, "memory should keep the selection");

    memory.set_fail_writes(false);
    session.persist_all()?;
    let reopened = ctx.open(&store, &clock);
    ensure!(
        reopened.projection() == session.projection(),
        "persist_all should restore the full state"
    );
    Ok(())
}
