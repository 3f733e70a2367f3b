//! Command-line passport over a directory store.
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

use poolpass_engine::{
    CatalogLoader, Claim, ENGINE_CONFIG_NAME, EngineConfig, StampSession, ViewProjection,
};

use crate::assets::{FileCatalogLoader, SystemClock};
use crate::storage::FileStore;

pub type CliSession = StampSession<FileStore, SystemClock>;

/// A single state change requested from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassportCommand {
    Status,
    /// Claim `id`, or the selected location when `None`.
    Claim(Option<String>),
    Select(String),
    NextLocation,
    PreviousLocation,
    NextPage,
    PreviousPage,
    Reset,
}

/// Open the passport persisted under `state_dir`.
///
/// # Errors
///
/// Returns an error if the catalog or engine config cannot be loaded.
pub fn open_passport(state_dir: &Path, loader: &FileCatalogLoader) -> Result<CliSession> {
    let catalog = loader
        .load_locations()
        .context("failed to load the pool catalog")?;
    let config: EngineConfig = loader
        .load_config(ENGINE_CONFIG_NAME)
        .context("failed to load the engine config")?;
    let clock = SystemClock::new(config.date_format);
    Ok(StampSession::open(
        FileStore::new(state_dir),
        clock,
        catalog,
        config,
    ))
}

/// Apply `command` and describe the outcome in one line.
///
/// # Errors
///
/// Returns an error if the new state cannot be written.
pub fn apply_command(session: &mut CliSession, command: &PassportCommand) -> Result<String> {
    let message = match command {
        PassportCommand::Status => String::new(),
        PassportCommand::Claim(id) => {
            let claim = match id {
                Some(id) => session.claim(id),
                None => session.claim_selected(),
            }
            .context("failed to save the stamp")?;
            let label = id
                .clone()
                .or_else(|| session.selected_location().map(|l| l.id.clone()))
                .unwrap_or_default();
            match claim {
                Claim::Stamped(record) if session.completion_reached() => {
                    format!("Stamped {label} on {}. Passport complete!", record.date)
                }
                Claim::Stamped(record) => format!("Stamped {label} on {}", record.date),
                Claim::AlreadyStamped(record) => {
                    format!("{label} was already stamped on {}", record.date)
                }
                Claim::UnknownLocation => format!("Unknown location '{label}'"),
            }
        }
        PassportCommand::Select(id) => match session.select(id)? {
            Some(index) => format!("Selected {id} (#{})", index + 1),
            None => format!("Unknown location '{id}'"),
        },
        PassportCommand::NextLocation => {
            let index = session.next_location()?;
            format!("Selected #{}", index + 1)
        }
        PassportCommand::PreviousLocation => {
            let index = session.previous_location()?;
            format!("Selected #{}", index + 1)
        }
        PassportCommand::NextPage => {
            session.next_page()?;
            session.projection().page_label
        }
        PassportCommand::PreviousPage => {
            session.previous_page()?;
            session.projection().page_label
        }
        PassportCommand::Reset => {
            session.reset().context("failed to reset the passport")?;
            "Passport reset".to_string()
        }
    };
    Ok(message)
}

pub fn write_status<W: Write + ?Sized>(writer: &mut W, projection: &ViewProjection) -> Result<()> {
    let badge = if projection.completed {
        projection.badge.bright_green().bold()
    } else {
        projection.badge.bold()
    };
    writeln!(writer, "{} {badge}", "🏊 Pool Passport".bright_cyan().bold())?;
    writeln!(writer)?;

    for location in &projection.locations {
        let marker = if location.selected { "▶" } else { " " };
        let stamp = if location.stamped { "✅" } else { "⬜" };
        let date = location.date.as_deref().unwrap_or("");
        writeln!(
            writer,
            "{marker} {stamp} {:24} {:28} {date}",
            location.id, location.name
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", projection.page_label.yellow())?;
    if projection.stamps.is_empty() {
        writeln!(writer, "   No stamps yet")?;
    }
    for stamp in &projection.stamps {
        writeln!(writer, "   {} - {}", stamp.date, stamp.name)?;
    }
    Ok(())
}
