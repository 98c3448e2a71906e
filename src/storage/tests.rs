//! Behaviour every `QuoteStorage` backend has to share.
//!
//! Each check takes a fresh, empty backend; the `backend_suite!` macro at
//! the bottom instantiates the whole list once per implementation.

use crate::error_handling::types::StorageError;
use crate::irc::IrcMessage;
use crate::storage::storage_trait::QuoteStorage;

const CHAN: &str = "#quotes";

fn msg(nick: &str, text: &str) -> IrcMessage {
    IrcMessage::privmsg(format!("{}!user@{}.example.org", nick, nick), CHAN, text)
}

fn ids(grabs: &[crate::storage::types::QuoteGrab]) -> Vec<i64> {
    grabs.iter().map(|g| g.id).collect()
}

pub(super) fn scenario_single_grab(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("bob", "hello there"), "carol").unwrap();

    let grab = store.get(CHAN, 1).unwrap();
    assert_eq!(grab.id, 1);
    assert_eq!(grab.by, "bob");
    assert_eq!(grab.grabber, "carol");
    assert_eq!(grab.hostmask, "bob!user@bob.example.org");
    assert_eq!(grab.text, "<bob> hello there");

    assert_eq!(store.random(CHAN, Some("bob")).unwrap(), "<bob> hello there");
    assert!(store.search(CHAN, "xyz").unwrap_err().is_not_found());

    store.remove(CHAN, Some(1)).unwrap();
    assert!(store.get(CHAN, 1).unwrap_err().is_not_found());
}

pub(super) fn list_is_reverse_insertion_order(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("alice", "first"), "x").unwrap();
    store.add(CHAN, &msg("bob", "interleaved"), "x").unwrap();
    store.add(CHAN, &msg("alice", "second"), "x").unwrap();
    store.add(CHAN, &msg("alice", "third"), "x").unwrap();

    let grabs = store.list(CHAN, "alice").unwrap();
    assert_eq!(ids(&grabs), vec![4, 3, 1]);
    let texts: Vec<&str> = grabs.iter().map(|g| g.text.as_str()).collect();
    assert_eq!(texts, vec!["<alice> third", "<alice> second", "<alice> first"]);
    assert!(grabs.iter().all(|g| g.by == "alice"));
}

pub(super) fn duplicate_add_is_a_no_op(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("bob", "spam"), "x").unwrap();
    store.add(CHAN, &msg("bob", "spam"), "y").unwrap();
    assert_eq!(store.list(CHAN, "bob").unwrap().len(), 1);

    // case variants of the nick count as the same speaker, but the stored
    // text differs, so this one is kept
    store.add(CHAN, &msg("BOB", "spam"), "x").unwrap();
    assert_eq!(store.list(CHAN, "bob").unwrap().len(), 2);

    // only the latest grab is compared
    store.add(CHAN, &msg("bob", "other"), "x").unwrap();
    store.add(CHAN, &msg("bob", "spam"), "x").unwrap();
    assert_eq!(store.list(CHAN, "bob").unwrap().len(), 4);
}

pub(super) fn remove_latest_then_empty(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("alice", "one"), "x").unwrap();
    store.add(CHAN, &msg("bob", "two"), "x").unwrap();

    store.remove(CHAN, None).unwrap();
    assert!(store.get(CHAN, 2).unwrap_err().is_not_found());
    assert_eq!(store.get(CHAN, 1).unwrap().text, "<alice> one");

    store.remove(CHAN, None).unwrap();
    assert!(store.remove(CHAN, None).unwrap_err().is_not_found());
}

pub(super) fn remove_missing_id_leaves_store_unchanged(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("alice", "keep me"), "x").unwrap();
    assert!(store.remove(CHAN, Some(42)).unwrap_err().is_not_found());
    assert_eq!(ids(&store.list(CHAN, "alice").unwrap()), vec![1]);
}

pub(super) fn ids_are_never_reused(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("alice", "one"), "x").unwrap();
    store.add(CHAN, &msg("alice", "two"), "x").unwrap();
    store.remove(CHAN, None).unwrap();
    store.add(CHAN, &msg("alice", "three"), "x").unwrap();
    assert_eq!(ids(&store.list(CHAN, "alice").unwrap()), vec![3, 1]);
}

pub(super) fn nick_lookup_uses_casemapping(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("Alice", "hi all"), "x").unwrap();
    store.add(CHAN, &msg("Foo[away]", "brb"), "x").unwrap();

    assert_eq!(ids(&store.list(CHAN, "alice").unwrap()), vec![1]);
    assert_eq!(store.get_quote(CHAN, "ALICE").unwrap(), "<Alice> hi all");
    assert_eq!(store.random(CHAN, Some("foo{AWAY}")).unwrap(), "<Foo[away]> brb");
    assert!(store.select(CHAN, "alicia").unwrap_err().is_not_found());
}

pub(super) fn latest_text_and_timestamp(store: &dyn QuoteStorage) {
    assert!(store.get_quote(CHAN, "bob").unwrap_err().is_not_found());
    assert!(store.select(CHAN, "bob").unwrap_err().is_not_found());

    let before = chrono::Utc::now().timestamp();
    store.add(CHAN, &msg("bob", "older"), "x").unwrap();
    store.add(CHAN, &msg("bob", "newer"), "x").unwrap();
    let after = chrono::Utc::now().timestamp();

    assert_eq!(store.get_quote(CHAN, "bob").unwrap(), "<bob> newer");
    let at = store.select(CHAN, "bob").unwrap();
    assert!(before <= at && at <= after);
}

pub(super) fn random_selection(store: &dyn QuoteStorage) {
    assert!(store.random(CHAN, None).unwrap_err().is_not_found());

    store.add(CHAN, &msg("alice", "a1"), "x").unwrap();
    store.add(CHAN, &msg("bob", "b1"), "x").unwrap();
    store.add(CHAN, &msg("alice", "a2"), "x").unwrap();

    for _ in 0..20 {
        let quote = store.random(CHAN, Some("alice")).unwrap();
        assert!(quote == "<alice> a1" || quote == "<alice> a2", "{}", quote);
        let any = store.random(CHAN, None).unwrap();
        assert!(["<alice> a1", "<bob> b1", "<alice> a2"].contains(&any.as_str()));
    }
    assert!(store.random(CHAN, Some("carol")).unwrap_err().is_not_found());
}

pub(super) fn search_returns_newest_first_with_speakers(store: &dyn QuoteStorage) {
    store.add(CHAN, &msg("alice", "rust is fun"), "x").unwrap();
    store.add(CHAN, &msg("bob", "go is fine"), "x").unwrap();
    store.add(CHAN, &msg("carol", "trust me"), "x").unwrap();

    let found = store.search(CHAN, "rust").unwrap();
    assert_eq!(ids(&found), vec![3, 1]);
    let speakers: Vec<&str> = found.iter().map(|g| g.by.as_str()).collect();
    assert_eq!(speakers, vec!["carol", "alice"]);

    // LIKE wildcards are plain text here
    assert!(store.search(CHAN, "r_st").unwrap_err().is_not_found());
    assert!(store.search(CHAN, "%").unwrap_err().is_not_found());
    assert!(store.search(CHAN, "RUST").unwrap_err().is_not_found());
}

pub(super) fn channels_are_independent(store: &dyn QuoteStorage) {
    store.add("#one", &msg("alice", "only here"), "x").unwrap();
    assert!(store.list("#two", "alice").unwrap_err().is_not_found());
    store.add("#two", &msg("alice", "and here"), "x").unwrap();
    assert_eq!(store.get("#two", 1).unwrap().text, "<alice> and here");
    assert_eq!(store.get("#ONE", 1).unwrap().text, "<alice> only here");
}

pub(super) fn channel_names_with_url_characters(store: &dyn QuoteStorage) {
    let channels = ["#what?", "#50%41off", "#50Aoff", "#a#b", "#x?mode=ro"];
    for (i, chan) in channels.iter().enumerate() {
        let text = format!("hello from {}", i);
        store
            .add(chan, &IrcMessage::privmsg("bob!b@h", *chan, text.as_str()), "x")
            .unwrap();
    }
    for (i, chan) in channels.iter().enumerate() {
        assert_eq!(
            store.get_quote(chan, "bob").unwrap(),
            format!("<bob> hello from {}", i),
            "{}",
            chan
        );
        assert_eq!(ids(&store.list(chan, "bob").unwrap()), vec![1], "{}", chan);
    }
}

pub(super) fn actions_are_stored_in_narrative_form(store: &dyn QuoteStorage) {
    let action = IrcMessage::action("dave!d@h", CHAN, "waves hello");
    store.add(CHAN, &action, "x").unwrap();
    assert_eq!(store.get_quote(CHAN, "dave").unwrap(), "* dave waves hello");
}

pub(super) fn not_found_is_distinguishable(store: &dyn QuoteStorage) {
    let err = store.get(CHAN, 1).unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

macro_rules! backend_suite {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;
            use tempfile::TempDir;

            fn with_store(check: fn(&dyn QuoteStorage)) {
                let dir = TempDir::new().unwrap();
                let make = $make;
                let store = make(dir.path());
                check(&store);
                store.close();
            }

            #[test]
            fn scenario_single_grab() { with_store(super::scenario_single_grab) }
            #[test]
            fn list_is_reverse_insertion_order() { with_store(super::list_is_reverse_insertion_order) }
            #[test]
            fn duplicate_add_is_a_no_op() { with_store(super::duplicate_add_is_a_no_op) }
            #[test]
            fn remove_latest_then_empty() { with_store(super::remove_latest_then_empty) }
            #[test]
            fn remove_missing_id_leaves_store_unchanged() { with_store(super::remove_missing_id_leaves_store_unchanged) }
            #[test]
            fn ids_are_never_reused() { with_store(super::ids_are_never_reused) }
            #[test]
            fn nick_lookup_uses_casemapping() { with_store(super::nick_lookup_uses_casemapping) }
            #[test]
            fn latest_text_and_timestamp() { with_store(super::latest_text_and_timestamp) }
            #[test]
            fn random_selection() { with_store(super::random_selection) }
            #[test]
            fn search_returns_newest_first_with_speakers() { with_store(super::search_returns_newest_first_with_speakers) }
            #[test]
            fn channels_are_independent() { with_store(super::channels_are_independent) }
            #[test]
            fn channel_names_with_url_characters() { with_store(super::channel_names_with_url_characters) }
            #[test]
            fn actions_are_stored_in_narrative_form() { with_store(super::actions_are_stored_in_narrative_form) }
            #[test]
            fn not_found_is_distinguishable() { with_store(super::not_found_is_distinguishable) }
        }
    };
}

fn storage_config(dir: &std::path::Path) -> crate::configuration::types::StorageConfig {
    crate::configuration::types::StorageConfig {
        data_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

backend_suite!(sqlite, |dir: &std::path::Path| {
    crate::storage::sqlite_storage::SqliteStorage::new(&storage_config(dir))
});

#[cfg(feature = "orm")]
backend_suite!(orm, |dir: &std::path::Path| {
    crate::storage::database_storage::DatabaseStorage::new(&storage_config(dir)).unwrap()
});
