use std::sync::Arc;
use std::time::Duration;

use rollcall_attendance::api::DataApi;
use rollcall_attendance::config::RemoteSettings;
use rollcall_attendance::domain::repository::{
    AttendanceRepository, ClassRepository, Storage, StudentRepository, UserRepository,
};
use rollcall_attendance::domain::types::{
    AttendanceRange, AttendanceStatus, ClassPatch, NewUser, Role, StudentPatch,
};
use rollcall_attendance::error::AttendanceError;
use rollcall_attendance::infra::backend::Backend;
use rollcall_attendance::infra::kv::MemoryKv;
use rollcall_attendance_migration::{Migrator, MigratorTrait};

use crate::helpers::{date, mark, new_class, new_student, remote_store};

// ── Selection ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_select_remote_backend_when_reachable() {
    let settings = RemoteSettings {
        url: "sqlite::memory:".into(),
        key: "unused".into(),
    };

    let backend = Backend::select(Some(settings), Arc::new(MemoryKv::default()))
        .await
        .unwrap();

    let Backend::Remote(store) = &backend else {
        panic!("expected remote backend");
    };
    Migrator::up(&store.db, None).await.unwrap();
    assert!(backend.is_remote());
    // The remote path does not seed a default admin.
    assert!(backend.list_users().await.unwrap().is_empty());
}

// ── Reads ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_newest_first() {
    let store = remote_store().await;
    for name in ["first", "second", "third"] {
        store.create_class(&new_class(name)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let names: Vec<String> = store
        .list_classes()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();

    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn should_order_attendance_by_date_descending() {
    let store = remote_store().await;
    let class = store.create_class(&new_class("Math")).await.unwrap();
    let ann = store
        .create_student(&new_student("Ann", "ann@x.com", &class.id))
        .await
        .unwrap();
    for day in ["2024-02-02", "2024-02-05", "2024-02-01"] {
        store
            .upsert_attendance(&mark(&ann.id, &class.id, day, AttendanceStatus::Present))
            .await
            .unwrap();
    }

    let dates: Vec<_> = store
        .list_attendance()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.date)
        .collect();

    assert_eq!(
        dates,
        vec![date("2024-02-05"), date("2024-02-02"), date("2024-02-01")]
    );
}

#[tokio::test]
async fn should_filter_range_inclusively() {
    let store = remote_store().await;
    let class = store.create_class(&new_class("Math")).await.unwrap();
    let other = store.create_class(&new_class("Art")).await.unwrap();
    let ann = store
        .create_student(&new_student("Ann", "ann@x.com", &class.id))
        .await
        .unwrap();
    for (class_id, day) in [
        (&class.id, "2024-01-31"),
        (&class.id, "2024-02-01"),
        (&class.id, "2024-02-29"),
        (&other.id, "2024-02-10"),
        (&class.id, "2024-03-01"),
    ] {
        store
            .upsert_attendance(&mark(&ann.id, class_id, day, AttendanceStatus::Present))
            .await
            .unwrap();
    }

    let mut range = AttendanceRange::new(date("2024-02-01"), date("2024-02-29"));
    assert_eq!(store.list_attendance_in_range(&range).await.unwrap().len(), 3);

    range.class_id = Some(class.id.clone());
    let records = store.list_attendance_in_range(&range).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.class_id == class.id));
}

#[tokio::test]
async fn should_select_classes_by_id_set() {
    let store = remote_store().await;
    let a = store.create_class(&new_class("a")).await.unwrap();
    store.create_class(&new_class("b")).await.unwrap();

    let found = store
        .list_classes_by_ids(&[a.id.clone(), "missing".into()])
        .await
        .unwrap();

    assert_eq!(found, vec![a]);
    assert!(store.list_classes_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_round_trip_assigned_classes() {
    let store = remote_store().await;
    let created = store
        .create_user(&NewUser {
            username: "teach".into(),
            password: "secret".into(),
            role: Role::Teacher,
            assigned_classes: vec!["c1".into(), "c2".into()],
        })
        .await
        .unwrap();

    let found = store.find_user_by_username("teach").await.unwrap().unwrap();

    assert_eq!(found, created);
    assert_eq!(found.password, "secret");
    assert!(store.find_user_by_username("Teach").await.unwrap().is_none());
}

// ── Writes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_record_id_across_upserts() {
    let store = remote_store().await;
    let class = store.create_class(&new_class("Math")).await.unwrap();
    let ann = store
        .create_student(&new_student("Ann", "ann@x.com", &class.id))
        .await
        .unwrap();

    let first = store
        .upsert_attendance(&mark(&ann.id, &class.id, "2024-02-01", AttendanceStatus::Present))
        .await
        .unwrap();
    let second = store
        .upsert_attendance(&mark(&ann.id, &class.id, "2024-02-01", AttendanceStatus::Absent))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.status, AttendanceStatus::Absent);
    assert_eq!(store.list_attendance().await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_none_when_updating_missing_rows() {
    let store = remote_store().await;
    assert!(
        store
            .update_class("missing", &ClassPatch::default())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .update_student("missing", &StudentPatch::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn should_apply_partial_student_update() {
    let store = remote_store().await;
    let class = store.create_class(&new_class("Math")).await.unwrap();
    let ann = store
        .create_student(&new_student("Ann", "ann@x.com", &class.id))
        .await
        .unwrap();

    let updated = store
        .update_student(
            &ann.id,
            &StudentPatch {
                email: Some("ann@school.org".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.email, "ann@school.org");
    assert_eq!(updated.name, "Ann");
    assert_eq!(store.find_student(&ann.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn should_reject_attendance_for_unknown_student() {
    let store = remote_store().await;
    let class = store.create_class(&new_class("Math")).await.unwrap();

    let result = store
        .upsert_attendance(&mark("ghost", &class.id, "2024-02-01", AttendanceStatus::Present))
        .await;

    assert!(matches!(result, Err(AttendanceError::Backend(_))));
}

// ── Failure handling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_degrade_reads_and_fail_writes_after_connection_loss() {
    let store = remote_store().await;
    let class = store.create_class(&new_class("Math")).await.unwrap();
    store.db.clone().close().await.unwrap();
    let api = DataApi::new(store);

    assert!(api.get_classes().await.is_empty());
    assert!(api.get_class_by_id(&class.id).await.is_none());
    assert!(api.get_attendance_records().await.is_empty());
    assert!(matches!(
        api.add_class(&new_class("Art")).await,
        Err(AttendanceError::Backend(_))
    ));
}
