//! Session store: default session, keyed sessions, and isolation.

use oracle_arena::oracles::RuleOracle;
use oracle_arena::{
    ArenaErrorKind, DEFAULT_SESSION_ID, OracleRegistry, SessionSettings, SessionStore,
};
use oracle_board::{Cell, Player};
use std::sync::Arc;
use std::thread;

fn store() -> SessionStore {
    let oracles = OracleRegistry::builder()
        .register("Rules", RuleOracle)
        .build()
        .unwrap();
    SessionStore::new(Arc::new(oracles), SessionSettings::new(Player::O, Some(17)))
}

#[test]
fn test_default_session_is_always_present() {
    let store = store();
    let snap = store.get();
    assert_eq!(snap.session_id, DEFAULT_SESSION_ID);
    assert_eq!(snap.move_count, 0);
    assert!(store.list().is_empty());
}

#[test]
fn test_default_session_moves_and_resets() {
    let store = store();
    store.with_default(|s| s.submit_human_move(4)).unwrap();
    store.with_default(|s| s.submit_automated_move()).unwrap();
    assert_eq!(store.get().move_count, 2);

    let fresh = store.reset();
    assert_eq!(fresh.move_count, 0);
    assert_eq!(fresh, store.get());
}

#[test]
fn test_create_rejects_taken_ids() {
    let store = store();
    store.create("alice".to_string()).unwrap();

    let err = store.create("alice".to_string()).unwrap_err();
    assert!(matches!(err.kind(), ArenaErrorKind::SessionExists(_)));

    let err = store.create(DEFAULT_SESSION_ID.to_string()).unwrap_err();
    assert!(matches!(err.kind(), ArenaErrorKind::SessionExists(_)));
}

#[test]
fn test_unknown_session_not_found() {
    let store = store();
    for err in [
        store.get_session("ghost").unwrap_err(),
        store.drop_session("ghost").unwrap_err(),
        store.with_session("ghost", |s| s.reset()).unwrap_err(),
    ] {
        assert!(matches!(err.kind(), ArenaErrorKind::SessionNotFound(_)));
    }
}

#[test]
fn test_sessions_are_independent() {
    let store = store();
    store.create("a".to_string()).unwrap();
    store.create("b".to_string()).unwrap();

    store
        .with_session("a", |s| s.submit_human_move(0))
        .unwrap()
        .unwrap();

    assert_eq!(store.get_session("a").unwrap().board[0], Cell::Occupied(Player::X));
    assert_eq!(store.get_session("b").unwrap().move_count, 0);
    assert_eq!(store.get().move_count, 0);
}

#[test]
fn test_generated_ids_are_unique() {
    let store = store();
    store.create("session-1".to_string()).unwrap();

    let first = store.create_generated();
    let second = store.create_generated();
    assert_ne!(first.session_id, "session-1");
    assert_ne!(first.session_id, second.session_id);
    assert_eq!(store.list().len(), 3);
}

#[test]
fn test_drop_then_list() {
    let store = store();
    for id in ["c", "a", "b"] {
        store.create(id.to_string()).unwrap();
    }
    assert_eq!(store.list(), ["a", "b", "c"]);

    let last = store.drop_session("b").unwrap();
    assert_eq!(last.session_id, "b");
    assert_eq!(store.list(), ["a", "c"]);
    assert!(store.get_session("b").is_err());
}

#[test]
fn test_concurrent_games_on_separate_sessions() {
    let store = store();
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                let id = format!("player-{}", n);
                store.create(id.clone()).unwrap();
                loop {
                    let done = store
                        .with_session(&id, |s| {
                            if s.is_game_over() {
                                return true;
                            }
                            if s.turn() == s.automated_player() {
                                s.submit_automated_move().unwrap();
                            } else {
                                let index = s.board().empty_cells()[0];
                                s.submit_human_move(index).unwrap();
                            }
                            false
                        })
                        .unwrap();
                    if done {
                        break;
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let ids = store.list();
    assert_eq!(ids.len(), 8);
    for id in ids {
        let snap = store.get_session(&id).unwrap();
        assert!(snap.game_over);
        assert_eq!(snap.oracles[0].total, u64::from(snap.move_count));
    }
}

#[test]
fn test_default_id_addresses_default_session() {
    let store = store();
    store
        .with_session(DEFAULT_SESSION_ID, |s| s.submit_human_move(4))
        .unwrap()
        .unwrap();

    assert_eq!(store.get().move_count, 1);
    assert_eq!(store.get_session(DEFAULT_SESSION_ID).unwrap(), store.get());
    assert!(store.list().is_empty());

    let err = store.drop_session(DEFAULT_SESSION_ID).unwrap_err();
    assert!(matches!(err.kind(), ArenaErrorKind::ReservedSession(_)));
    assert_eq!(store.get().move_count, 1);
}
