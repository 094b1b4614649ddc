//! Artifact model persistence: snapshots, whole-model dumps and the cache

mod common;

use common::Fixture;
use depend::ast::{CodeModel, ModelError, Modifiers, Token, TypeSnapshot};
use depend::storage::{open_cache, CacheDriver, CacheSettings, RedbCache};

fn tokens() -> Vec<Token> {
    vec![
        Token::new(1, "class", 4, 4, 1, 5),
        Token::new(2, "User", 4, 4, 7, 10),
        Token::new(3, "}", 12, 12, 1, 1),
    ]
}

#[test]
fn snapshot_round_trip_relinks_the_type() {
    let mut f = Fixture::new("app");
    f.class("Base");
    let user = f.class("User");
    f.extends(user, "app\\Base");
    let save = f.method(user, "save");

    let json = serde_json::to_string(&f.model.snapshot_type(user).unwrap()).unwrap();
    f.model.routine_mut(save).unwrap().parent = None;

    let snapshot: TypeSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(f.model.restore_type(snapshot).unwrap(), user);
    assert_eq!(f.model.get(save).unwrap().parent(), Some(user));
    assert_eq!(f.model.namespace_of(user), Some(f.ns));
    assert_eq!(
        f.model.resolve(f.model.type_data(user).unwrap().parent.as_ref().unwrap()),
        f.model.lookup_type("app\\Base")
    );
}

#[test]
fn whole_model_dump_keeps_identifiers() {
    let mut f = Fixture::new("app");
    let user = f.class("User");
    let save = f.method(user, "save");

    let json = serde_json::to_string(&f.model).unwrap();
    let mut restored: CodeModel = serde_json::from_str(&json).unwrap();
    restored.reindex();

    assert_eq!(restored.lookup_type("app\\User"), Some(user));
    assert_eq!(restored.qualified_name(save), "app\\User::save");
    assert_eq!(restored.get(save).unwrap().parent(), Some(user));
}

#[test]
fn tokens_survive_in_a_redb_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.redb");

    let mut f = Fixture::new("app");
    let user = f.class("User");
    f.model.attach_cache(Box::new(RedbCache::new(&path, "run").unwrap()));
    f.model.set_tokens(user, tokens()).unwrap();

    let artifact = f.model.get(user).unwrap();
    assert!(artifact.is_cached());
    assert_eq!((artifact.start_line(), artifact.end_line()), (4, 12));
    assert_eq!(f.model.tokens(user).unwrap(), tokens());

    // A fresh handle on the same file sees the stored entry
    drop(f.model.detach_cache());
    let settings = CacheSettings {
        driver: CacheDriver::Redb,
        location: path,
    };
    f.model.attach_cache(open_cache(&settings, "run").unwrap());
    assert_eq!(f.model.tokens(user).unwrap(), tokens());
}

#[test]
fn tokens_without_cache_stay_in_memory() {
    let mut f = Fixture::new("app");
    let user = f.class("User");
    assert!(f.model.tokens(user).unwrap().is_empty());
    assert_eq!(f.model.get(user).unwrap().start_line(), 0);

    f.model.set_tokens(user, tokens()).unwrap();
    assert!(!f.model.get(user).unwrap().is_cached());
    assert_eq!(f.model.tokens(user).unwrap().len(), 3);
    assert_eq!(f.model.get(user).unwrap().end_line(), 12);
}

#[test]
fn first_named_compilation_unit_wins() {
    let mut f = Fixture::new("app");
    let user = f.class("User");
    let first = f.model.add_compilation_unit(Some("src/User.php"));
    let second = f.model.add_compilation_unit(Some("src/Other.php"));

    f.model.set_compilation_unit(user, first).unwrap();
    f.model.set_compilation_unit(user, second).unwrap();
    assert_eq!(f.model.get(user).unwrap().unit(), Some(first));
}

#[test]
fn modifiers_are_validated_and_assigned_once() {
    let mut f = Fixture::new("app");
    let user = f.class("User");

    let err = f
        .model
        .set_modifiers(user, Modifiers::ABSTRACT | Modifiers::FINAL)
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidModifiers { .. }));
    assert!(!f.model.get(user).unwrap().is_abstract());

    f.model.set_modifiers(user, Modifiers::FINAL).unwrap();
    let err = f.model.set_modifiers(user, Modifiers::PUBLIC).unwrap_err();
    assert!(matches!(err, ModelError::ModifiersAlreadySet { .. }));
}
