use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use taskboard::config::{Config, TASKS_FILE_NAME};
use taskboard::fields::{Priority, SortKey, Status, WeekStart};
use taskboard::session::Session;
use taskboard::store::{JsonStore, TaskQuery, TaskStore};
use taskboard::task::{TaskDraft, TaskPatch};
use taskboard::Error;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn home() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn tasks_survive_reopening_the_store() {
    let dir = home();
    let path = dir.path().join(TASKS_FILE_NAME);
    let session = Session::new("u-1", Some("Ana".into()));

    let id = {
        let mut store = JsonStore::open(&path).unwrap();
        let t = store
            .create(
                &session,
                TaskDraft {
                    client: Some("Acme".into()),
                    due_date: Some(d(2024, 3, 13)),
                    priority: Some(Priority::High),
                    ..TaskDraft::new("Landing page")
                },
            )
            .unwrap();
        store.set_status(&t.id, Status::Completed).unwrap();
        t.id
    };

    let store = JsonStore::open(&path).unwrap();
    let t = store.get(&id).unwrap();
    assert_eq!(t.title, "Landing page");
    assert_eq!(t.client.as_deref(), Some("Acme"));
    assert_eq!(t.due_date, Some(d(2024, 3, 13)));
    assert_eq!(t.priority, Priority::High);
    assert_eq!(t.status, Status::Completed);
    assert!(t.completed_at.is_some());
    assert_eq!(t.creator_id, "u-1");
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn missing_file_is_an_empty_store() {
    let dir = home();
    let store = JsonStore::open(&dir.path().join("nested/tasks.json")).unwrap();
    assert!(store.list(&TaskQuery::default()).unwrap().is_empty());
}

#[test]
fn first_write_creates_parent_directories() {
    let dir = home();
    let path = dir.path().join("nested/deeper/tasks.json");
    let mut store = JsonStore::open(&path).unwrap();
    store
        .create(&Session::new("u-1", None), TaskDraft::new("a"))
        .unwrap();
    assert!(path.exists());
}

#[test]
fn malformed_dates_on_disk_load_as_absent() {
    let dir = home();
    let path = dir.path().join(TASKS_FILE_NAME);
    fs::write(
        &path,
        r#"{"tasks":[{
            "id":"t-1","title":"Broken date","due_date":"not-a-date",
            "start_date":"2024-03-11T09:00:00Z","priority":"High","status":"Completed",
            "creator_id":"u-1",
            "created_at":"2024-03-01T12:00:00Z","updated_at":"2024-03-02T12:00:00Z"
        }]}"#,
    )
    .unwrap();

    let store = JsonStore::open(&path).unwrap();
    let t = store.get("t-1").unwrap();
    assert_eq!(t.due_date, None);
    assert_eq!(t.start_date, Some(d(2024, 3, 11)));
    assert_eq!(t.priority, Priority::High);
    // Completed without a stamp gets one on load.
    assert_eq!(t.completed_at, Some(t.updated_at));
}

#[test]
fn corrupt_file_is_reported_not_replaced() {
    let dir = home();
    let path = dir.path().join(TASKS_FILE_NAME);
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(JsonStore::open(&path), Err(Error::Json(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn clearing_fields_persists() {
    let dir = home();
    let path = dir.path().join(TASKS_FILE_NAME);
    let mut store = JsonStore::open(&path).unwrap();
    let t = store
        .create(
            &Session::new("u-1", None),
            TaskDraft {
                sector: Some("Design".into()),
                due_date: Some(d(2024, 3, 15)),
                ..TaskDraft::new("a")
            },
        )
        .unwrap();
    store
        .update(
            &t.id,
            TaskPatch {
                sector: Some(None),
                due_date: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

    let reopened = JsonStore::open(&path).unwrap();
    let t = reopened.get(&t.id).unwrap();
    assert_eq!(t.sector, None);
    assert_eq!(t.due_date, None);
}

#[test]
fn session_round_trip_and_clear() {
    let dir = home();
    assert_eq!(Session::load(dir.path()).unwrap(), None);

    let s = Session::new("u-9", Some("Rui".into()));
    s.save(dir.path()).unwrap();
    let loaded = Session::load(dir.path()).unwrap().unwrap();
    assert_eq!(loaded.user_id, "u-9");
    assert_eq!(loaded.label(), "Rui");

    assert!(Session::clear(dir.path()).unwrap());
    assert!(!Session::clear(dir.path()).unwrap());
    assert_eq!(Session::load(dir.path()).unwrap(), None);
}

#[test]
fn config_defaults_and_round_trip() {
    let dir = home();
    assert_eq!(Config::load(dir.path()).unwrap(), Config::default());

    let cfg = Config {
        week_start: WeekStart::Sunday,
        default_sort: SortKey::Priority,
    };
    cfg.save(dir.path()).unwrap();
    assert_eq!(Config::load(dir.path()).unwrap(), cfg);
}
