//! Rebuilding an instance from another instance's action log.

mod common;

use common::*;
use multiverse_core::{action_log::{replay, ActionLogEntry}, types::ROOT_CHARACTER_ID, Action, Multiverse};

fn apply_and_record(mv: &mut Multiverse, subtick: i64, character_id: i64, action: Action) {
    mv.apply(&action, character_id);
    mv.record_action(subtick, character_id, &action).unwrap();
}

#[test]
fn replay_reproduces_state_and_log() {
    let mut a = instance();
    apply_and_record(&mut a.mv, 0, ROOT_CHARACTER_ID, player("player1"));
    apply_and_record(&mut a.mv, 1, ROOT_CHARACTER_ID, universe(None));
    a.mv.commit().unwrap();

    apply_and_record(&mut a.mv, 0, ROOT_CHARACTER_ID, location(1, "London", "rain"));
    apply_and_record(&mut a.mv, 1, ROOT_CHARACTER_ID, location(1, "Tbilisi", "sun"));
    apply_and_record(&mut a.mv, 2, ROOT_CHARACTER_ID, connect(1, "London", "Tbilisi", 33));
    apply_and_record(&mut a.mv, 3, 99, player("intruder"));
    a.mv.commit().unwrap();

    a.mv.commit().unwrap();
    apply_and_record(&mut a.mv, 5, ROOT_CHARACTER_ID, universe(Some(1)));
    apply_and_record(&mut a.mv, 6, ROOT_CHARACTER_ID, character(Some("player1"), Some(2), None));
    a.mv.commit().unwrap();

    let log = a.mv.root().actions().unwrap();
    let mut b = instance();
    replay(&mut b.mv, &log).unwrap();

    assert_eq!(snapshot(&b.mv), snapshot(&a.mv));
    assert_eq!(b.mv.universe_ids(), vec![1, 2]);
    assert_eq!(b.mv.parent_universe(2).unwrap(), Some(1));
}

#[test]
fn replay_of_empty_log_does_nothing() {
    let mut b = instance();
    let before = snapshot(&b.mv);
    replay(&mut b.mv, &Vec::<ActionLogEntry>::new()).unwrap();
    assert_eq!(snapshot(&b.mv), before);
}
