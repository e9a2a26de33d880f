//! Root-only enforcement across every action kind.

mod common;

use common::*;
use multiverse_core::{Action, ErrorKind};

fn seeded() -> TestInstance {
    let mut t = instance();
    root(&mut t.mv, player("player1"));
    root(&mut t.mv, universe(None));
    root(&mut t.mv, location(1, "A", "first"));
    root(&mut t.mv, location(1, "B", "second"));
    root(&mut t.mv, character(Some("player1"), Some(1), None));
    t.mv.commit().unwrap();
    t
}

fn every_kind() -> Vec<Action> {
    vec![
        player("player2"),
        universe(None),
        location(1, "C", "third"),
        connect(1, "A", "B", 10),
        character(Some("player1"), None, None),
    ]
}

/// Neither a player-bound character nor an unknown id may shape the world.
#[test]
fn non_root_actions_leave_state_untouched() {
    for character_id in [1, 123] {
        let mut t = seeded();
        let before = snapshot(&t.mv);

        for action in every_kind() {
            t.mv.apply(&action, character_id);
        }

        assert_eq!(snapshot(&t.mv), before);
        let rejections = t.mv.take_rejections();
        assert_eq!(rejections.len(), 5);
        assert!(rejections.iter().all(|r| r.kind == ErrorKind::Unauthorized));
        assert!(rejections.iter().all(|r| r.character_id == character_id));
    }
}

/// The same batch from root goes through.
#[test]
fn root_applies_every_kind() {
    let mut t = seeded();
    let before = snapshot(&t.mv);

    for action in every_kind() {
        root(&mut t.mv, action);
    }

    assert!(t.mv.rejections().is_empty(), "{:?}", t.mv.rejections());
    let after = snapshot(&t.mv);
    assert_eq!(after.players.len(), before.players.len() + 1);
    assert_eq!(after.universes.len(), before.universes.len() + 1);
    assert_eq!(after.characters.len(), before.characters.len() + 1);
    assert_eq!(after.graphs[0].1.len(), 3);
    assert_eq!(after.graphs[0].2.len(), 2);
}

/// A rejected batch entry does not stop the rest of the batch.
#[test]
fn bad_action_does_not_abort_the_batch() {
    let mut t = instance();
    root(&mut t.mv, player("a"));
    root(&mut t.mv, connect(1, "X", "Y", 1));
    t.mv.apply(&player("b"), 77);
    root(&mut t.mv, player("c"));
    t.mv.commit().unwrap();

    assert_eq!(t.mv.root().players().unwrap(), vec!["root", "a", "c"]);
    assert_eq!(t.mv.rejections().len(), 2);
}
