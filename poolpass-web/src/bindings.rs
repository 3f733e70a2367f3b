//! JavaScript-facing wrapper around the stamp session.
//!
//! The presentation layer (map, DOM, overlays) calls these methods on user
//! events and re-renders from [`PoolPassport::projection`] afterwards.
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::passport::{Claim, StoreError, WebSession, create_web_session};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimResult {
    outcome: &'static str,
    date: Option<String>,
    /// True only on the claim that completed the passport.
    just_completed: bool,
}

fn store_error(err: &StoreError) -> JsValue {
    log::error!("Progress not saved: {err}");
    dom::console_error(&format!("Progress not saved: {err}"));
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub struct PoolPassport {
    session: WebSession,
}

#[wasm_bindgen]
impl PoolPassport {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: create_web_session(),
        }
    }

    /// Stamp a pool with today's date.
    ///
    /// # Errors
    /// Rejects with a message if the progress could not be saved.
    pub fn claim(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let was_complete = self.session.completion_reached();
        let claim = self.session.claim(id).map_err(|e| store_error(&e))?;
        let outcome = match &claim {
            Claim::Stamped(_) => "stamped",
            Claim::AlreadyStamped(_) => "alreadyStamped",
            Claim::UnknownLocation => "unknownLocation",
        };
        to_js(&ClaimResult {
            outcome,
            date: claim.record().map(|record| record.stamp_date().display),
            just_completed: !was_complete && self.session.completion_reached(),
        })
    }

    /// # Errors
    /// Rejects with a message if the progress could not be saved.
    #[wasm_bindgen(js_name = claimSelected)]
    pub fn claim_selected(&mut self) -> Result<JsValue, JsValue> {
        let Some(id) = self
            .session
            .selected_location()
            .map(|location| location.id.clone())
        else {
            return self.claim("");
        };
        self.claim(&id)
    }

    /// # Errors
    /// Rejects with a message if the selection could not be saved.
    #[wasm_bindgen(js_name = nextLocation)]
    pub fn next_location(&mut self) -> Result<usize, JsValue> {
        self.session.next_location().map_err(|e| store_error(&e))
    }

    /// # Errors
    /// Rejects with a message if the selection could not be saved.
    #[wasm_bindgen(js_name = previousLocation)]
    pub fn previous_location(&mut self) -> Result<usize, JsValue> {
        self.session.previous_location().map_err(|e| store_error(&e))
    }

    /// Returns the new index, or `undefined` for an unknown id.
    ///
    /// # Errors
    /// Rejects with a message if the selection could not be saved.
    pub fn select(&mut self, id: &str) -> Result<Option<usize>, JsValue> {
        self.session.select(id).map_err(|e| store_error(&e))
    }

    /// # Errors
    /// Rejects with a message if the page could not be saved.
    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> Result<usize, JsValue> {
        self.session.next_page().map_err(|e| store_error(&e))
    }

    /// # Errors
    /// Rejects with a message if the page could not be saved.
    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) -> Result<usize, JsValue> {
        self.session.previous_page().map_err(|e| store_error(&e))
    }

    /// # Errors
    /// Rejects with a message if the cleared passport could not be saved.
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.session.reset().map_err(|e| store_error(&e))
    }

    /// Retry saving everything after a failed write.
    ///
    /// # Errors
    /// Rejects with a message if the store is still refusing writes.
    #[wasm_bindgen(js_name = persistAll)]
    pub fn persist_all(&self) -> Result<(), JsValue> {
        self.session.persist_all().map_err(|e| store_error(&e))
    }

    /// # Errors
    /// Rejects if the projection cannot be converted to a JS object.
    pub fn projection(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.projection())
    }

    #[wasm_bindgen(js_name = isVisited)]
    #[must_use]
    pub fn is_visited(&self, id: &str) -> bool {
        self.session.is_visited(id)
    }

    #[wasm_bindgen(js_name = completionReached)]
    #[must_use]
    pub fn completion_reached(&self) -> bool {
        self.session.completion_reached()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.session.revision()
    }
}

impl Default for PoolPassport {
    fn default() -> Self {
        Self::new()
    }
}
