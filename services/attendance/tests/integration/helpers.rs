use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::Database;

use rollcall_attendance::domain::types::{AttendanceMark, AttendanceStatus, NewClass, NewStudent};
use rollcall_attendance::infra::backend::Backend;
use rollcall_attendance::infra::kv::MemoryKv;
use rollcall_attendance::infra::local::LocalStore;
use rollcall_attendance::infra::remote::RemoteStore;
use rollcall_attendance_migration::{Migrator, MigratorTrait};

// ── Stores ───────────────────────────────────────────────────────────────────

/// Local store over a fresh in-memory substrate, seeded.
pub fn local_store() -> LocalStore {
    let store = LocalStore::new(Arc::new(MemoryKv::default()));
    store.seed().unwrap();
    store
}

/// Remote store over a migrated in-memory SQLite database.
pub async fn remote_store() -> RemoteStore {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    RemoteStore::new(db)
}

/// One backend of each kind, for parity checks.
pub async fn both_backends() -> Vec<Backend> {
    vec![
        Backend::Local(local_store()),
        Backend::Remote(remote_store().await),
    ]
}

// ── Inputs ───────────────────────────────────────────────────────────────────

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn new_class(name: &str) -> NewClass {
    NewClass {
        name: name.into(),
        subject: format!("{name} subject"),
        schedule: "MWF 10am".into(),
    }
}

pub fn new_student(name: &str, email: &str, class_id: &str) -> NewStudent {
    NewStudent {
        name: name.into(),
        email: email.into(),
        class_id: class_id.into(),
        enrollment_date: Some(date("2024-01-15")),
    }
}

pub fn mark(student_id: &str, class_id: &str, day: &str, status: AttendanceStatus) -> AttendanceMark {
    AttendanceMark {
        student_id: student_id.into(),
        class_id: class_id.into(),
        date: date(day),
        status,
    }
}
