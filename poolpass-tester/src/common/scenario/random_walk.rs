//! Seeded operation walks.
use anyhow::{Context, Result, ensure};
use rand::Rng;
use std::collections::BTreeMap;

use poolpass_engine::{Catalog, DateStyle, FixedClock};

use super::{ScenarioCtx, ScenarioSession, check_invariants};

const WALK_STEPS: usize = 200;
const REOPEN_EVERY: usize = 50;

/// A day in 2023..=2026 in either date style.
pub fn random_date(rng: &mut impl Rng) -> String {
    let year = rng.gen_range(2023..=2026);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    let style = if rng.gen_bool(0.5) {
        DateStyle::Display
    } else {
        DateStyle::Iso
    };
    style.format(year, month, day)
}

/// Apply one random operation and name it.
///
/// Reset is rare so walks build up several pages.
pub fn apply_random_op(
    session: &mut ScenarioSession,
    clock: &FixedClock,
    catalog: &Catalog,
    rng: &mut impl Rng,
) -> Result<&'static str> {
    let op = match rng.gen_range(0..100) {
        0..=34 => {
            clock.set(random_date(rng));
            let index = rng.gen_range(0..catalog.len().max(1));
            match catalog.get(index) {
                Some(location) => {
                    let id = location.id.clone();
                    session.claim(&id)?;
                }
                None => {
                    session.claim("no-such-pool")?;
                }
            }
            "claim"
        }
        35..=44 => {
            clock.set(random_date(rng));
            session.claim_selected()?;
            "claim-selected"
        }
        45..=59 => {
            session.next_location()?;
            "next-location"
        }
        60..=69 => {
            session.previous_location()?;
            "previous-location"
        }
        70..=84 => {
            session.next_page()?;
            "next-page"
        }
        85..=96 => {
            session.previous_page()?;
            "previous-page"
        }
        _ => {
            session.reset()?;
            "reset"
        }
    };
    Ok(op)
}

pub fn random_walk(ctx: &ScenarioCtx) -> Result<()> {
    ctx.require_locations(1)?;
    let mut rng = ctx.rng();
    let store = ctx.fresh_store();
    let clock = FixedClock::new("01/01/2025");
    let mut session = ctx.open(&store, &clock);
    let mut dates: BTreeMap<String, String> = BTreeMap::new();

    for step in 1..=WALK_STEPS {
        let before = session.visited_count();
        let op = apply_random_op(&mut session, &clock, &ctx.catalog, &mut rng)?;
        check_invariants(&session).with_context(|| format!("step {step} ({op})"))?;

        if op == "reset" {
            dates.clear();
        }
        for (id, record) in session.ledger().iter() {
            let first = dates
                .entry(id.to_string())
                .or_insert_with(|| record.date.clone());
            ensure!(
                *first == record.date,
                "step {step} ({op}): {id} date moved from {first} to {}",
                record.date
            );
        }
        if op != "reset" {
            ensure!(
                session.visited_count() >= before,
                "step {step} ({op}): a stamp disappeared without reset"
            );
        }

        if step % REOPEN_EVERY == 0 {
            let reopened = ctx.open(&store, &clock);
            ensure!(
                reopened.projection() == session.projection(),
                "step {step}: reloaded projection differs"
            );
            session = reopened;
        }
    }

    if ctx.verbose {
        log::info!(
            "random walk seed {} finished with {} stamps",
            ctx.seed,
            session.visited_count()
        );
    }
    Ok(())
}
