#![cfg(target_arch = "wasm32")]

use minefield_core::*;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn fresh_seed_is_drawn_from_the_browser_clock() {
    let config = MinefieldConfig::new(9, 9, 10).unwrap();

    let session = GameSession::new(config, AssistOptions::default()).unwrap();

    assert!(session.config().seed.is_some());
    assert_ne!(fresh_seed(), fresh_seed());
}

#[wasm_bindgen_test]
fn seeded_game_replays_and_saves() {
    let config = Difficulty::Beginner.config().unwrap().with_seed(42);
    let mut session = GameSession::new(config, AssistOptions::default()).unwrap();
    session.open(40).unwrap();

    let mut again = session.retry();
    again.open(40).unwrap();
    assert_eq!(again.current_state(), session.current_state());

    let record = SaveRecord::from_json(&session.save().to_json()).unwrap();
    let restored = GameSession::restore(&record, AssistOptions::default()).unwrap();
    assert_eq!(restored.current_state(), session.current_state());
}
