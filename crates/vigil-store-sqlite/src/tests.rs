//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use vigil_core::{
  store::Registry,
  subject::{NewSubject, Registration},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn alice() -> NewSubject {
  NewSubject {
    id:           "u1".into(),
    display_name: "Alice".into(),
    contact_id:   Some("c1".into()),
  }
}

fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find() {
  let s = store().await;

  let created = match s.create(alice()).await.unwrap() {
    Registration::Created(subject) => subject,
    other => panic!("expected Created, got {other:?}"),
  };
  assert_eq!(created.id, "u1");
  assert!(created.enabled);
  assert!(created.last_checkin_at.is_none());

  let fetched = s.find("u1").await.unwrap().expect("stored subject");
  assert_eq!(fetched.display_name, "Alice");
  assert_eq!(fetched.contact_id.as_deref(), Some("c1"));
  assert!(fetched.last_checkin_at.is_none());
  assert!(fetched.enabled);
}

#[tokio::test]
async fn find_missing_returns_none() {
  let s = store().await;
  assert!(s.find("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_registration_leaves_first_record() {
  let s = store().await;
  s.create(alice()).await.unwrap();
  s.record_checkin("u1", at(9)).await.unwrap();

  let second = s
    .create(NewSubject {
      id:           "u1".into(),
      display_name: "Mallory".into(),
      contact_id:   Some("c2".into()),
    })
    .await
    .unwrap();
  assert_eq!(second, Registration::AlreadyExists);

  let fetched = s.find("u1").await.unwrap().unwrap();
  assert_eq!(fetched.display_name, "Alice");
  assert_eq!(fetched.contact_id.as_deref(), Some("c1"));
  assert_eq!(fetched.last_checkin_at, Some(at(9)));
}

#[tokio::test]
async fn contact_may_be_absent() {
  let s = store().await;
  s.create(NewSubject {
    id:           "solo".into(),
    display_name: "Solo".into(),
    contact_id:   None,
  })
  .await
  .unwrap();

  let fetched = s.find("solo").await.unwrap().unwrap();
  assert!(fetched.contact_id.is_none());
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn checkin_on_unknown_id_mutates_nothing() {
  let s = store().await;
  s.create(alice()).await.unwrap();

  assert!(s.record_checkin("ghost", at(9)).await.unwrap().is_none());
  assert!(s.find("ghost").await.unwrap().is_none());
  assert!(s.find("u1").await.unwrap().unwrap().last_checkin_at.is_none());
}

#[tokio::test]
async fn checkin_sets_timestamp() {
  let s = store().await;
  s.create(alice()).await.unwrap();

  let updated = s.record_checkin("u1", at(9)).await.unwrap().unwrap();
  assert_eq!(updated.last_checkin_at, Some(at(9)));
  assert_eq!(
    s.find("u1").await.unwrap().unwrap().last_checkin_at,
    Some(at(9))
  );
}

#[tokio::test]
async fn checkin_never_moves_backwards() {
  let s = store().await;
  s.create(alice()).await.unwrap();

  s.record_checkin("u1", at(12)).await.unwrap();
  let after_stale = s.record_checkin("u1", at(8)).await.unwrap().unwrap();
  assert_eq!(after_stale.last_checkin_at, Some(at(12)));

  let later = at(12) + TimeDelta::milliseconds(1);
  let after_fresh = s.record_checkin("u1", later).await.unwrap().unwrap();
  assert_eq!(after_fresh.last_checkin_at, Some(later));
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_enabled_skips_disabled_subjects() {
  let s = store().await;
  for id in ["a", "b", "c"] {
    s.create(NewSubject {
      id:           id.into(),
      display_name: id.to_uppercase(),
      contact_id:   None,
    })
    .await
    .unwrap();
  }

  assert!(s.set_enabled("b", false).await.unwrap());
  assert!(!s.set_enabled("zzz", false).await.unwrap());

  let ids: Vec<String> = s
    .list_enabled()
    .await
    .unwrap()
    .into_iter()
    .map(|subject| subject.id)
    .collect();
  assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn reopening_a_file_keeps_subjects() {
  let dir = std::env::temp_dir().join(format!(
    "vigil-store-test-{}-{}",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
  ));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("vigil.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create(alice()).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.find("u1").await.unwrap().is_some());

  std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn undecodable_row_does_not_hide_healthy_subjects() {
  let dir = std::env::temp_dir().join(format!(
    "vigil-store-corrupt-{}-{}",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
  ));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("vigil.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create(alice()).await.unwrap();
    s.create(NewSubject {
      id:           "u2".into(),
      display_name: "Bob".into(),
      contact_id:   Some("c2".into()),
    })
    .await
    .unwrap();
  }

  let raw = rusqlite::Connection::open(&path).unwrap();
  raw
    .execute(
      "UPDATE subjects SET last_checkin_at = 'garbage' WHERE subject_id = 'u2'",
      [],
    )
    .unwrap();
  drop(raw);

  let s = SqliteStore::open(&path).await.unwrap();
  let ids: Vec<String> = s
    .list_enabled()
    .await
    .unwrap()
    .into_iter()
    .map(|subject| subject.id)
    .collect();
  assert_eq!(ids, vec!["u1".to_string()]);

  std::fs::remove_dir_all(&dir).ok();
}
