//! Local calendar date for stamping.
use poolpass_engine::{Clock, DateStyle};

/// Reads today's local date from the host and formats it per [`DateStyle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowserClock {
    style: DateStyle,
}

impl BrowserClock {
    #[must_use]
    pub const fn new(style: DateStyle) -> Self {
        Self { style }
    }

    #[must_use]
    pub const fn style(&self) -> DateStyle {
        self.style
    }
}

impl Clock for BrowserClock {
    fn today(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            let now = js_sys::Date::new_0();
            let year = i32::try_from(now.get_full_year()).unwrap_or_default();
            // JS months are zero-based.
            self.style
                .format(year, now.get_month() + 1, now.get_date())
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            use chrono::Datelike;
            let now = chrono::Local::now().date_naive();
            self.style.format(now.year(), now.month(), now.day())
        }
    }
}
