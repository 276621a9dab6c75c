//! Filesystem-backed local store tests.

use personalization::domain::error::StorageError;
use personalization::domain::ports::LocalStore;
use personalization::infra::storage::FileStore;

const KEY: &str = "nb:personalization:v1:user-42";

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    store.save(KEY, r#"{"version":1}"#).unwrap();
    store.save(KEY, r#"{"version":1,"tone":"formal"}"#).unwrap();

    assert_eq!(
        store.load(KEY).unwrap().as_deref(),
        Some(r#"{"version":1,"tone":"formal"}"#)
    );
}

#[test]
fn missing_key_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("not-created-yet"));

    assert!(store.load(KEY).unwrap().is_none());
    store.remove(KEY).unwrap();
}

#[test]
fn remove_deletes_only_that_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save(KEY, "a").unwrap();
    store.save("nb:personalization:v1:other", "b").unwrap();

    store.remove(KEY).unwrap();

    assert!(store.load(KEY).unwrap().is_none());
    assert_eq!(
        store
            .load("nb:personalization:v1:other")
            .unwrap()
            .as_deref(),
        Some("b")
    );
}

#[test]
fn file_names_are_hex_encoded_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save(KEY, "{}").unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec![format!("{}.json", hex::encode(KEY))]);
}

#[test]
fn oversized_value_is_refused_and_previous_value_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path()).with_value_quota(16);
    store.save(KEY, "small").unwrap();

    let err = store.save(KEY, &"x".repeat(17)).unwrap_err();

    assert!(matches!(
        err,
        StorageError::QuotaExceeded {
            needed: 17,
            limit: 16
        }
    ));
    assert_eq!(store.load(KEY).unwrap().as_deref(), Some("small"));
}

#[test]
fn directory_path_occupied_by_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("prefs");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = FileStore::new(&blocker);

    let err = store.save(KEY, "{}").unwrap_err();

    assert!(matches!(err, StorageError::Unavailable(_)));
}
