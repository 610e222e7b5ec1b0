use std::sync::Arc;

use rollcall_attendance::domain::repository::{
    AttendanceRepository, ClassRepository, StudentRepository, UserRepository,
};
use rollcall_attendance::domain::types::AttendanceStatus;
use rollcall_attendance::infra::kv::{FileKv, KeyValueStore, MemoryKv};
use rollcall_attendance::infra::local::{LocalStore, RECORDS_KEY, USERS_KEY};

use crate::helpers::{local_store, mark, new_class, new_student};

#[tokio::test]
async fn should_persist_collections_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let class_id = {
        let store = LocalStore::new(Arc::new(FileKv::open(dir.path()).unwrap()));
        store.seed().unwrap();
        store.create_class(&new_class("Math")).await.unwrap().id
    };

    let reopened = LocalStore::new(Arc::new(FileKv::open(dir.path()).unwrap()));
    reopened.seed().unwrap();

    assert!(reopened.find_class(&class_id).await.unwrap().is_some());
    assert_eq!(reopened.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_store_collections_as_plain_json_arrays() {
    let kv = Arc::new(MemoryKv::default());
    let store = LocalStore::new(kv.clone());
    store.seed().unwrap();

    let users: serde_json::Value =
        serde_json::from_str(&kv.get(USERS_KEY).unwrap().unwrap()).unwrap();

    let admin = &users[0];
    assert_eq!(admin["username"], "admin");
    assert_eq!(admin["password"], "admin123");
    assert_eq!(admin["role"], "admin");
    assert_eq!(admin["assignedClasses"], serde_json::json!([]));
    assert!(admin["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn should_read_collections_written_by_other_clients() {
    let kv = Arc::new(MemoryKv::default());
    kv.set(
        RECORDS_KEY,
        r#"[{"id":"r1","studentId":"s1","classId":"c1","date":"2024-02-01","status":"late"}]"#,
    )
    .unwrap();
    let store = LocalStore::new(kv);

    let records = store.list_attendance_by_student("s1").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Late);
}

#[tokio::test]
async fn should_keep_other_classes_intact_on_cascade() {
    let store = local_store();
    let doomed = store.create_class(&new_class("Doomed")).await.unwrap();
    let kept = store.create_class(&new_class("Kept")).await.unwrap();
    let a = store
        .create_student(&new_student("A", "a@x.com", &doomed.id))
        .await
        .unwrap();
    let b = store
        .create_student(&new_student("B", "b@x.com", &kept.id))
        .await
        .unwrap();
    // A record filed under the surviving class for the removed student.
    store
        .upsert_attendance(&mark(&a.id, &kept.id, "2024-02-01", AttendanceStatus::Present))
        .await
        .unwrap();
    store
        .upsert_attendance(&mark(&b.id, &kept.id, "2024-02-01", AttendanceStatus::Present))
        .await
        .unwrap();

    store.delete_class(&doomed.id).await.unwrap();

    let records = store.list_attendance().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, b.id);
    assert_eq!(store.list_classes().await.unwrap(), vec![kept]);
}

/// Upserts read, modify and rewrite the whole collection without a lock. A
/// writer holding a stale snapshot overwrites marks stored in between.
#[tokio::test]
async fn should_lose_update_when_writers_interleave() {
    let kv = Arc::new(MemoryKv::default());
    let store = LocalStore::new(kv.clone());
    store.seed().unwrap();

    let stale = kv.get(RECORDS_KEY).unwrap().unwrap();
    store
        .upsert_attendance(&mark("s1", "c1", "2024-02-01", AttendanceStatus::Present))
        .await
        .unwrap();
    kv.set(RECORDS_KEY, &stale).unwrap();

    assert!(store.list_attendance().await.unwrap().is_empty());
}
