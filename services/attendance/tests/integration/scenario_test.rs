use std::collections::HashSet;

use rollcall_attendance::api::DataApi;
use rollcall_attendance::domain::repository::Storage;
use rollcall_attendance::domain::types::{AttendanceStatus, NewClass, NewUser, Role, UserPatch};
use rollcall_attendance::error::AttendanceError;
use rollcall_attendance::infra::backend::Backend;

use crate::helpers::{both_backends, date, mark, new_class, new_student};

// Every scenario runs once per backend; both must end in the same state.

#[tokio::test]
async fn should_keep_latest_status_for_a_day_on_both_backends() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);

        let math = api
            .add_class(&NewClass {
                name: "Math".into(),
                subject: "Mathematics".into(),
                schedule: "MWF 10am".into(),
            })
            .await
            .unwrap();
        let ann = api
            .add_student(&new_student("Ann", "ann@x.com", &math.id))
            .await
            .unwrap();
        api.upsert_attendance(&mark(&ann.id, &math.id, "2024-02-01", AttendanceStatus::Present))
            .await
            .unwrap();
        api.upsert_attendance(&mark(&ann.id, &math.id, "2024-02-01", AttendanceStatus::Late))
            .await
            .unwrap();

        let records = api
            .get_attendance_by_date_and_class(date("2024-02-01"), &math.id)
            .await;

        assert_eq!(records.len(), 1, "{remote}");
        assert_eq!(records[0].status, AttendanceStatus::Late, "{remote}");
        assert_eq!(records[0].student_id, ann.id, "{remote}");
    }
}

#[tokio::test]
async fn should_read_back_what_was_added() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);

        let class = api.add_class(&new_class("Science")).await.unwrap();
        assert!(!class.id.is_empty(), "{remote}");
        assert_eq!(class.name, "Science", "{remote}");
        assert_eq!(api.get_class_by_id(&class.id).await, Some(class.clone()), "{remote}");

        let student = api
            .add_student(&new_student("Bo", "bo@x.com", &class.id))
            .await
            .unwrap();
        assert_eq!(student.enrollment_date, date("2024-01-15"), "{remote}");
        assert_eq!(
            api.get_student_by_id(&student.id).await,
            Some(student.clone()),
            "{remote}"
        );

        let record = api
            .upsert_attendance(&mark(&student.id, &class.id, "2024-03-01", AttendanceStatus::Absent))
            .await
            .unwrap();
        assert_eq!(api.get_attendance_records().await, vec![record], "{remote}");
    }
}

#[tokio::test]
async fn should_leave_no_orphans_after_class_delete() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);

        let doomed = api.add_class(&new_class("Doomed")).await.unwrap();
        let kept = api.add_class(&new_class("Kept")).await.unwrap();
        let a = api
            .add_student(&new_student("A", "a@x.com", &doomed.id))
            .await
            .unwrap();
        let b = api
            .add_student(&new_student("B", "b@x.com", &kept.id))
            .await
            .unwrap();
        for (student, class) in [(&a.id, &doomed.id), (&b.id, &kept.id)] {
            api.upsert_attendance(&mark(student, class, "2024-02-01", AttendanceStatus::Present))
                .await
                .unwrap();
        }

        api.delete_class(&doomed.id).await.unwrap();

        assert!(api.get_class_by_id(&doomed.id).await.is_none(), "{remote}");
        let students = api.get_students().await;
        assert_eq!(students, vec![b.clone()], "{remote}");
        let records = api.get_attendance_records().await;
        assert_eq!(records.len(), 1, "{remote}");
        assert!(
            records
                .iter()
                .all(|r| r.class_id != doomed.id && r.student_id != a.id),
            "{remote}"
        );
    }
}

#[tokio::test]
async fn should_remove_student_records_with_student() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);

        let class = api.add_class(&new_class("Math")).await.unwrap();
        let a = api
            .add_student(&new_student("A", "a@x.com", &class.id))
            .await
            .unwrap();
        api.upsert_attendance(&mark(&a.id, &class.id, "2024-02-01", AttendanceStatus::Late))
            .await
            .unwrap();

        api.delete_student(&a.id).await.unwrap();

        assert!(api.get_attendance_by_student(&a.id).await.is_empty(), "{remote}");
        assert_eq!(api.get_classes().await.len(), 1, "{remote}");
    }
}

#[tokio::test]
async fn should_enforce_username_uniqueness_on_both_backends() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);
        let input = NewUser {
            username: "teach".into(),
            password: "pw".into(),
            role: Role::Teacher,
            assigned_classes: vec![],
        };

        api.add_user(&input).await.unwrap();
        let before = api.get_users().await;
        let result = api.add_user(&input).await;

        assert!(matches!(result, Err(AttendanceError::UsernameTaken)), "{remote}");
        assert_eq!(api.get_users().await, before, "{remote}");
    }
}

#[tokio::test]
async fn should_scope_teacher_classes_on_both_backends() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);

        let c1 = api.add_class(&new_class("c1")).await.unwrap();
        api.add_class(&new_class("c2")).await.unwrap();
        let c3 = api.add_class(&new_class("c3")).await.unwrap();
        let teacher = api
            .add_user(&NewUser {
                username: "teach".into(),
                password: "pw".into(),
                role: Role::Teacher,
                assigned_classes: vec![c1.id.clone(), c3.id.clone()],
            })
            .await
            .unwrap();
        let admin = api
            .add_user(&NewUser {
                username: "boss".into(),
                password: "pw".into(),
                role: Role::Admin,
                assigned_classes: vec![c1.id.clone()],
            })
            .await
            .unwrap();

        let ids: HashSet<String> = api
            .get_classes_for_teacher(&teacher.id)
            .await
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, HashSet::from([c1.id.clone(), c3.id.clone()]), "{remote}");
        assert!(api.get_classes_for_teacher(&admin.id).await.is_empty(), "{remote}");
        assert!(api.get_classes_for_teacher("nobody").await.is_empty(), "{remote}");
    }
}

#[tokio::test]
async fn should_update_users_and_refuse_admin_delete_on_both_backends() {
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);
        let admin = api
            .add_user(&NewUser {
                username: "root".into(),
                password: "pw".into(),
                role: Role::Admin,
                assigned_classes: vec![],
            })
            .await
            .unwrap();

        let renamed = api
            .update_user(
                &admin.id,
                &UserPatch {
                    username: Some("superuser".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.username, "superuser", "{remote}");
        assert_eq!(renamed.created_at, admin.created_at, "{remote}");

        let result = api.delete_user(&admin.id).await;
        assert!(
            matches!(result, Err(AttendanceError::AdminAccountProtected)),
            "{remote}"
        );
        assert!(
            api.update_user("missing", &UserPatch::default())
                .await
                .unwrap()
                .is_none(),
            "{remote}"
        );
    }
}

#[tokio::test]
async fn should_accept_duplicate_email_and_class_name_on_direct_create() {
    // Uniqueness of these fields is only checked by CSV import.
    for backend in both_backends().await {
        let remote = backend_name(&backend);
        let api = DataApi::new(backend);

        let first = api.add_class(&new_class("Math")).await.unwrap();
        let second = api.add_class(&new_class("Math")).await.unwrap();
        api.add_student(&new_student("A", "same@x.com", &first.id))
            .await
            .unwrap();
        api.add_student(&new_student("B", "same@x.com", &second.id))
            .await
            .unwrap();

        assert_ne!(first.id, second.id, "{remote}");
        assert_eq!(api.get_classes().await.len(), 2, "{remote}");
        assert_eq!(api.get_students().await.len(), 2, "{remote}");
    }
}

fn backend_name(backend: &Backend) -> &'static str {
    if backend.is_remote() { "remote" } else { "local" }
}
