//! Deterministic walkthroughs of the passport operations.
use anyhow::{Context, Result, ensure};
use rand::Rng;
use rand::seq::SliceRandom;

use poolpass_engine::{Claim, FixedClock, completion_badge};

use super::random_walk::{apply_random_op, random_date};
use super::{ScenarioCtx, ScenarioSession, check_invariants};

/// Distinct, increasing display dates, one per index.
fn nth_date(index: usize) -> String {
    let day = index % 28 + 1;
    let month = (index / 28) % 12 + 1;
    let year = 2020 + index / 336;
    format!("{day:02}/{month:02}/{year}")
}

fn catalog_ids(ctx: &ScenarioCtx) -> Vec<String> {
    ctx.catalog.iter().map(|location| location.id.clone()).collect()
}

/// Every stamp across all pages, first page first, as `(id, sort_key)`.
pub fn collect_pages(session: &mut ScenarioSession) -> Result<Vec<(String, String)>> {
    while session.page() > 0 {
        session.previous_page()?;
    }
    let mut seen = Vec::new();
    loop {
        seen.extend(
            session
                .visible_stamps()
                .into_iter()
                .map(|entry| (entry.location.id.clone(), entry.date.sort_key)),
        );
        let before = session.page();
        if session.next_page()? == before {
            break;
        }
    }
    Ok(seen)
}

pub fn smoke(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let store = ctx.fresh_store();
    let clock = FixedClock::new("14/06/2025");
    let mut session = ctx.open(&store, &clock);
    let total = ctx.catalog.len();

    ensure!(session.visited_count() == 0, "fresh passport should be empty");
    ensure!(
        session.projection().badge == completion_badge(0, total),
        "fresh badge should read 0/{total}"
    );

    let first = session
        .selected_location()
        .map(|location| location.id.clone())
        .context("no selected location")?;
    let claim = session.claim_selected()?;
    ensure!(claim.is_new(), "first claim of {first} should stamp");
    ensure!(
        session.projection().badge == completion_badge(1, total),
        "badge should read 1/{total}"
    );
    ensure!(
        session.completion_reached() == (total == 1),
        "completion should only fire once every pool is stamped"
    );
    check_invariants(&session)?;

    let reopened = ctx.open(&store, &clock);
    ensure!(reopened.is_visited(&first), "{first} lost on reload");
    check_invariants(&reopened)
}

pub fn idempotence(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let ids = catalog_ids(ctx);
    let mut rng = ctx.rng();
    let target = ids.choose(&mut rng).context("empty catalog")?;

    let store = ctx.fresh_store();
    let clock = FixedClock::new("03/03/2025");
    let mut session = ctx.open(&store, &clock);
    let key = session.config().storage_keys().visited;

    ensure!(session.claim(target)?.is_new(), "first claim should stamp");
    let stored = store.get(&key)?;
    let revision = session.revision();

    for later in ["04/03/2025", "2026-01-01", "31/12/2030"] {
        clock.set(later);
        match session.claim(target)? {
            Claim::AlreadyStamped(record) => ensure!(
                record.date == "03/03/2025",
                "date changed to {} on repeat claim",
                record.date
            ),
            other => anyhow::bail!("repeat claim returned {other:?}"),
        }
    }
    ensure!(store.get(&key)? == stored, "repeat claims rewrote the ledger");
    ensure!(session.revision() == revision, "repeat claims bumped the revision");
    ensure!(
        session.claim("no-such-pool")? == Claim::UnknownLocation,
        "unknown ids should be rejected"
    );
    ensure!(session.visited_count() == 1, "exactly one stamp expected");
    Ok(())
}

pub fn wraparound(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let total = ctx.catalog.len();
    let store = ctx.fresh_store();
    let clock = FixedClock::new("01/01/2025");
    let mut session = ctx.open(&store, &clock);

    ensure!(session.selected_index() == 0, "selection should start at 0");
    let last = session.previous_location()?;
    ensure!(last == total - 1, "previous from 0 gave {last}, expected {}", total - 1);
    let first = session.next_location()?;
    ensure!(first == 0, "next from the end gave {first}");

    for _ in 0..total {
        session.next_location()?;
    }
    ensure!(
        session.selected_index() == 0,
        "{total} steps forward should return to the start"
    );

    let mut rng = ctx.rng();
    let target = rng.gen_range(0..total);
    let target_id = ctx.catalog.get(target).map(|l| l.id.clone()).context("index")?;
    ensure!(session.select(&target_id)? == Some(target), "select({target_id}) missed");
    ensure!(session.select("no-such-pool")?.is_none(), "unknown select should be ignored");
    ensure!(session.selected_index() == target, "unknown select moved the cursor");

    let reopened = ctx.open(&store, &clock);
    ensure!(
        reopened.selected_index() == target,
        "selection {target} not restored, got {}",
        reopened.selected_index()
    );
    Ok(())
}

pub fn reset(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let total = ctx.catalog.len();
    let store = ctx.fresh_store();
    let clock = FixedClock::new("01/01/2025");
    let mut session = ctx.open(&store, &clock);

    session.next_location()?;
    let selected = session.selected_index();
    for (index, id) in catalog_ids(ctx).iter().enumerate() {
        clock.set(nth_date(index));
        session.claim(id)?;
    }
    ensure!(session.completion_reached(), "all {total} stamped should complete");
    for _ in 0..session.page_count() {
        session.next_page()?;
    }

    session.reset()?;
    check_invariants(&session)?;
    ensure!(session.visited_count() == 0, "reset left stamps behind");
    ensure!(!session.completion_reached(), "reset should clear completion");
    ensure!(session.page() == 0 && session.page_count() == 1, "reset should land on page 0 of 1");
    ensure!(session.selected_index() == selected, "reset should keep the selection");

    let keys = session.config().storage_keys();
    ensure!(
        store.get(&keys.visited)?.as_deref() == Some("{}"),
        "reset should persist an empty ledger"
    );
    ensure!(
        store.get(&keys.stamp_page)?.as_deref() == Some("0"),
        "reset should persist page 0"
    );

    let reopened = ctx.open(&store, &clock);
    ensure!(reopened.visited_count() == 0, "reset lost on reload");
    Ok(())
}

pub fn pagination_bounds(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let total = ctx.catalog.len();
    let store = ctx.fresh_store();
    let clock = FixedClock::new("01/01/2025");
    let mut session = ctx.open(&store, &clock);
    let page_size = session.config().page_size;

    ensure!(session.page_count() == 1, "empty passport should have one page");
    ensure!(session.previous_page()? == 0, "previous at page 0 should stay");
    ensure!(session.next_page()? == 0, "next with no stamps should stay");

    for (index, id) in catalog_ids(ctx).iter().enumerate() {
        clock.set(nth_date(index));
        session.claim(id)?;
    }
    let expected_pages = total.div_ceil(page_size).max(1);
    ensure!(
        session.page_count() == expected_pages,
        "expected {expected_pages} pages, got {}",
        session.page_count()
    );

    let mut pages = Vec::new();
    for _ in 0..expected_pages {
        pages.push(session.visible_stamps().len());
        session.next_page()?;
    }
    ensure!(
        session.page() == expected_pages - 1,
        "next past the last page should saturate"
    );
    let (last, full) = pages.split_last().context("no pages")?;
    ensure!(
        full.iter().all(|&len| len == page_size),
        "inner pages should be full: {pages:?}"
    );
    ensure!(*last >= 1 && *last <= page_size, "last page size {last} invalid");

    let stamps = collect_pages(&mut session)?;
    let mut ids: Vec<&str> = stamps.iter().map(|(id, _)| id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    ensure!(
        ids.len() == total && stamps.len() == total,
        "pages should partition all {total} stamps"
    );
    check_invariants(&session)
}

pub fn date_order(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(2)?;
    let mut rng = ctx.rng();
    let mut ids = catalog_ids(ctx);
    ids.shuffle(&mut rng);

    let store = ctx.fresh_store();
    let clock = FixedClock::new("01/01/2025");
    let mut session = ctx.open(&store, &clock);
    for id in &ids {
        clock.set(random_date(&mut rng));
        session.claim(id)?;
    }

    let stamps = collect_pages(&mut session)?;
    ensure!(stamps.len() == ids.len(), "every claim should be listed");
    for pair in stamps.windows(2) {
        let (first_id, first_key) = &pair[0];
        let (second_id, second_key) = &pair[1];
        ensure!(
            first_key <= second_key,
            "{first_id} ({first_key}) listed before {second_id} ({second_key})"
        );
        if first_key == second_key {
            let first_index = ctx.catalog.index_of(first_id);
            let second_index = ctx.catalog.index_of(second_id);
            ensure!(
                first_index < second_index,
                "same-day stamps {first_id} and {second_id} should keep catalog order"
            );
        }
    }
    Ok(())
}

pub fn round_trip(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let mut rng = ctx.rng();
    let store = ctx.fresh_store();
    let clock = FixedClock::new("01/01/2025");
    let mut session = ctx.open(&store, &clock);

    for step in 0..40 {
        let op = apply_random_op(&mut session, &clock, &ctx.catalog, &mut rng)?;
        if ctx.verbose {
            log::debug!("round-trip step {step}: {op}");
        }
    }

    let reopened = ctx.open(&store, &clock);
    ensure!(
        reopened.ledger() == session.ledger(),
        "ledger differs after reload"
    );
    ensure!(
        reopened.projection() == session.projection(),
        "projection differs after reload"
    );
    Ok(())
}
