//! Stamp date normalization.
//!
//! Claim dates are stored as the already-formatted strings handed over by the
//! clock. Older saves carry ISO dates (`YYYY-MM-DD`), newer ones carry the
//! display form (`DD/MM/YYYY`). Both are reduced to a `YYYYMMDD` key for
//! ordering and to `DD/MM/YYYY` for display.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `YYYY-M-D`, alone or as the date part of a timestamp.
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:$|T)").expect("valid ISO date regex")
});
static DISPLAY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid display date regex")
});

/// Which form a clock should render "today" in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `DD/MM/YYYY`
    #[default]
    Display,
    /// `YYYY-MM-DD`
    Iso,
}

impl DateStyle {
    /// Render a calendar date in this style.
    #[must_use]
    pub fn format(self, year: i32, month: u32, day: u32) -> String {
        match self {
            Self::Display => format!("{day:02}/{month:02}/{year:04}"),
            Self::Iso => format!("{year:04}-{month:02}-{day:02}"),
        }
    }
}

/// Recognized shape of a stored date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateForm {
    Iso,
    Display,
    Unrecognized,
}

/// A stored claim date with its sort key and display text computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampDate {
    pub raw: String,
    pub form: DateForm,
    pub sort_key: String,
    pub display: String,
}

impl StampDate {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (form, parts) = match split_date(trimmed) {
            Some((form, year, month, day)) => (form, Some((year, month, day))),
            None => (DateForm::Unrecognized, None),
        };
        let (sort_key, display) = parts.map_or_else(
            || (strip_non_digits(trimmed), trimmed.to_string()),
            |(year, month, day)| {
                (
                    format!("{year}{month}{day}"),
                    format!("{day}/{month}/{year}"),
                )
            },
        );
        Self {
            raw: raw.to_string(),
            form,
            sort_key,
            display,
        }
    }
}

/// Canonical `YYYYMMDD` ordering key for a stored date string.
///
/// Unrecognized formats fall back to their digits only, which keeps them
/// comparable but not necessarily chronological.
#[must_use]
pub fn normalize_date_key(raw: &str) -> String {
    StampDate::parse(raw).sort_key
}

/// Display form `DD/MM/YYYY`, converting ISO input. Unrecognized input is
/// returned trimmed but otherwise untouched.
#[must_use]
pub fn display_date(raw: &str) -> String {
    StampDate::parse(raw).display
}

/// Split a date into zero-padded `(form, year, month, day)` parts.
fn split_date(value: &str) -> Option<(DateForm, String, String, String)> {
    if let Some(caps) = ISO_DATE.captures(value) {
        return Some((
            DateForm::Iso,
            caps[1].to_string(),
            pad2(&caps[2]),
            pad2(&caps[3]),
        ));
    }
    if let Some(caps) = DISPLAY_DATE.captures(value) {
        return Some((
            DateForm::Display,
            caps[3].to_string(),
            pad2(&caps[2]),
            pad2(&caps[1]),
        ));
    }
    None
}

fn pad2(part: &str) -> String {
    format!("{part:0>2}")
}

fn strip_non_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_and_display_forms_share_a_key() {
        assert_eq!(normalize_date_key("2025-01-05"), "20250105");
        assert_eq!(normalize_date_key("05/01/2025"), "20250105");
        assert_eq!(normalize_date_key(" 5/1/2025 "), "20250105");
    }

    #[test]
    fn iso_timestamps_use_the_date_prefix() {
        let date = StampDate::parse("2024-12-31T23:10:00Z");
        assert_eq!(date.form, DateForm::Iso);
        assert_eq!(date.sort_key, "20241231");
        assert_eq!(date.display, "31/12/2024");
    }

    #[test]
    fn trailing_text_after_an_iso_date_is_unrecognized() {
        let date = StampDate::parse("2025-01-05garbage");
        assert_eq!(date.form, DateForm::Unrecognized);
        assert_eq!(date.sort_key, "20250105");
        assert_eq!(date.display, "2025-01-05garbage");
        assert_eq!(StampDate::parse("2025-01-05 ").form, DateForm::Iso);
        assert_eq!(StampDate::parse("05/01/2025x").form, DateForm::Unrecognized);
    }

    #[test]
    fn unrecognized_dates_keep_digits_only() {
        let date = StampDate::parse("Jan 5, 2025");
        assert_eq!(date.form, DateForm::Unrecognized);
        assert_eq!(date.sort_key, "52025");
        assert_eq!(date.display, "Jan 5, 2025");
        assert_eq!(normalize_date_key(""), "");
    }

    #[test]
    fn mixed_formats_sort_chronologically() {
        let mut keys = vec![
            normalize_date_key("07/01/2025"),
            normalize_date_key("2025-01-05"),
            normalize_date_key("06/01/2025"),
        ];
        keys.sort();
        assert_eq!(keys, vec!["20250105", "20250106", "20250107"]);
    }

    #[test]
    fn display_converts_iso_and_pads() {
        assert_eq!(display_date("2025-03-09"), "09/03/2025");
        assert_eq!(display_date("9/3/2025"), "09/03/2025");
        assert_eq!(display_date("09/03/2025"), "09/03/2025");
    }

    #[test]
    fn date_style_formats_both_forms() {
        assert_eq!(DateStyle::Display.format(2025, 1, 2), "02/01/2025");
        assert_eq!(DateStyle::Iso.format(2025, 1, 2), "2025-01-02");
        assert_eq!(DateStyle::default(), DateStyle::Display);
    }
}
