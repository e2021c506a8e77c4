use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

use tasktab::io::storage::JsonFileStorage;
use tasktab::ops::store::TaskStore;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read fixture {}: {}", name, e))
}

/// Drop the `lastSaved` line, the one thing a save is expected to change.
fn without_last_saved(s: &str) -> String {
    s.lines()
        .filter(|l| !l.trim_start().starts_with("\"lastSaved\""))
        .collect::<Vec<_>>()
        .join("\n")
        .replace("\"nextTaskId\": 5,", "\"nextTaskId\": 5")
}

#[test]
fn applet_file_survives_load_and_save() {
    let source = fixture("applet_tasks.json");
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");
    fs::write(&path, &source).unwrap();

    let store = TaskStore::open(JsonFileStorage::new(&path));
    assert_eq!(store.len(), 3);
    assert_eq!(store.next_task_id(), 5);
    store.save().unwrap();

    let output = fs::read_to_string(&path).unwrap();
    assert_eq!(without_last_saved(&output), without_last_saved(&source));
}

#[test]
fn sorted_listing_of_applet_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");
    fs::write(&path, fixture("applet_tasks.json")).unwrap();

    let store = TaskStore::open(JsonFileStorage::new(&path));
    let ids: Vec<u64> = store.list_sorted().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![4, 3, 1]);
}

#[test]
fn edits_persist_across_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("nested/tasks.json");

    let mut store = TaskStore::open(JsonFileStorage::new(&path));
    let a = store.add_task("Water plants").unwrap();
    let b = store.add_task("Pay rent").unwrap();
    store.toggle_task(a.id).unwrap();
    store.delete_task(b.id).unwrap();

    let reopened = TaskStore::open(JsonFileStorage::new(&path));
    assert_eq!(reopened.tasks(), store.tasks());
    assert_eq!(reopened.next_task_id(), 3);
    assert!(reopened.get(a.id).unwrap().completed);
}
