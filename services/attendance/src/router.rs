use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use rollcall_core::health::{healthz, readyz};

use crate::handlers::{
    attendance::{list_attendance, list_attendance_in_range, upsert_attendance},
    classes::{
        class_import_template, create_class, delete_class, get_class, import_classes,
        list_class_students, list_classes, update_class,
    },
    dashboard::get_dashboard,
    reports::{export_report, get_report},
    students::{
        create_student, delete_student, get_student, import_students, list_students,
        student_import_template_file, update_student,
    },
    users::{
        assign_class, create_user, delete_user, get_user, list_teacher_classes, list_users,
        unassign_class, update_user,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/{id}/classes", get(list_teacher_classes))
        .route(
            "/users/{id}/classes/{class_id}",
            put(assign_class).delete(unassign_class),
        )
        // Classes
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/import", post(import_classes))
        .route("/classes/import/template", get(class_import_template))
        .route(
            "/classes/{id}",
            get(get_class).patch(update_class).delete(delete_class),
        )
        .route("/classes/{id}/students", get(list_class_students))
        // Students
        .route("/students", get(list_students).post(create_student))
        .route("/students/import", post(import_students))
        .route("/students/import/template", get(student_import_template_file))
        .route(
            "/students/{id}",
            get(get_student).patch(update_student).delete(delete_student),
        )
        // Attendance
        .route("/attendance", get(list_attendance).put(upsert_attendance))
        .route("/attendance/range", get(list_attendance_in_range))
        // Reports
        .route("/reports", get(get_report))
        .route("/reports/export", get(export_report))
        // Dashboard
        .route("/dashboard", get(get_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
