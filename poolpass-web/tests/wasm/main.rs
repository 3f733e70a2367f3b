#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use poolpass_web::bindings::PoolPassport;
use poolpass_web::dom;
use poolpass_web::passport::{PersistentStore, WebStore, create_web_session};

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn clear_passport_slots() {
    let storage = dom::local_storage().expect("localStorage");
    for key in ["poolpass.visited", "poolpass.selected", "poolpass.stampPage"] {
        storage.remove_item(key).expect("remove slot");
    }
}

#[wasm_bindgen_test]
fn web_store_round_trips_slots() {
    clear_passport_slots();
    let store = WebStore;
    assert_eq!(store.get("poolpass.selected").unwrap(), None);
    store.set("poolpass.selected", "3").unwrap();
    assert_eq!(store.get("poolpass.selected").unwrap().as_deref(), Some("3"));
    store.remove("poolpass.selected").unwrap();
    assert_eq!(store.get("poolpass.selected").unwrap(), None);
}

#[wasm_bindgen_test]
fn claims_survive_a_new_session() {
    clear_passport_slots();
    let mut session = create_web_session();
    let first = session.catalog().get(0).map(|l| l.id.clone()).expect("catalog");
    assert!(session.claim(&first).unwrap().is_new());
    session.next_location().unwrap();

    let reloaded = create_web_session();
    assert!(reloaded.is_visited(&first));
    assert_eq!(reloaded.selected_index(), 1);
    clear_passport_slots();
}

#[wasm_bindgen_test]
fn corrupt_local_storage_is_ignored() {
    clear_passport_slots();
    let storage = dom::local_storage().expect("localStorage");
    storage.set_item("poolpass.visited", "{broken").unwrap();
    storage.set_item("poolpass.stampPage", "-4").unwrap();
    let session = create_web_session();
    assert_eq!(session.visited_count(), 0);
    assert_eq!(session.page(), 0);
    clear_passport_slots();
}

#[wasm_bindgen_test]
fn facade_reports_completion_once() {
    clear_passport_slots();
    let mut passport = PoolPassport::new();
    let ids: Vec<String> = create_web_session()
        .catalog()
        .iter()
        .map(|l| l.id.clone())
        .collect();
    for id in &ids {
        passport.claim(id).unwrap();
    }
    assert!(passport.completion_reached());
    let again = passport.claim(&ids[0]).unwrap();
    let outcome = js_sys::Reflect::get(&again, &"outcome".into()).unwrap();
    assert_eq!(outcome.as_string().as_deref(), Some("alreadyStamped"));
    let just = js_sys::Reflect::get(&again, &"justCompleted".into()).unwrap();
    assert_eq!(just.as_bool(), Some(false));
    passport.reset().unwrap();
    assert!(!passport.is_visited(&ids[0]));
    clear_passport_slots();
}
