use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use rollcall_attendance::infra::backend::Backend;
use rollcall_attendance::router::build_router;
use rollcall_attendance::state::AppState;

use crate::helpers::local_store;

fn server() -> TestServer {
    let state = AppState::new(Backend::Local(local_store()));
    TestServer::new(build_router(state)).unwrap()
}

async fn create_class(server: &TestServer, name: &str) -> String {
    let resp = server
        .post("/classes")
        .json(&json!({ "name": name, "subject": "Mathematics", "schedule": "MWF 10am" }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    resp.json::<Value>()["id"].as_str().unwrap().to_owned()
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_probes() {
    let server = server();
    server.get("/healthz").await.assert_status_ok();
    let body: Value = server.get("/readyz").await.json();
    assert_eq!(body["status"], "ready");
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_never_expose_passwords() {
    let server = server();
    let resp = server
        .post("/users")
        .json(&json!({ "username": "teach", "password": "s3cret" }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let created: Value = resp.json();
    assert_eq!(created["role"], "teacher");
    assert!(created.get("password").is_none());

    let users: Value = server.get("/users").await.json();
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(!users.to_string().contains("s3cret"));
    assert!(!users.to_string().contains("admin123"));
}

#[tokio::test]
async fn should_map_user_errors_to_statuses() {
    let server = server();

    let dup = server
        .post("/users")
        .json(&json!({ "username": "admin", "password": "x" }))
        .await;
    dup.assert_status(StatusCode::CONFLICT);
    assert_eq!(dup.json::<Value>()["kind"], "USERNAME_TAKEN");

    let blank = server
        .post("/users")
        .json(&json!({ "username": " ", "password": "x" }))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(blank.json::<Value>()["message"], "Username is required");

    let users: Value = server.get("/users").await.json();
    let admin_id = users[0]["id"].as_str().unwrap();
    server
        .delete(&format!("/users/{admin_id}"))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .get("/users/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put("/users/missing/classes/c1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_assign_classes_to_teachers() {
    let server = server();
    let class_id = create_class(&server, "Math").await;
    let teacher: Value = server
        .post("/users")
        .json(&json!({ "username": "teach", "password": "pw" }))
        .await
        .json();
    let teacher_id = teacher["id"].as_str().unwrap();

    server
        .put(&format!("/users/{teacher_id}/classes/{class_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let classes: Value = server
        .get(&format!("/users/{teacher_id}/classes"))
        .await
        .json();
    assert_eq!(classes[0]["id"], class_id.as_str());

    server
        .delete(&format!("/users/{teacher_id}/classes/{class_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let classes: Value = server
        .get(&format!("/users/{teacher_id}/classes"))
        .await
        .json();
    assert_eq!(classes, json!([]));
}

// ── Classes & students ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_validate_before_writing_classes() {
    let server = server();
    let resp = server
        .post("/classes")
        .json(&json!({ "name": "Math", "subject": "" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["message"], "Subject is required");

    let class_id = create_class(&server, "Math").await;
    server
        .patch(&format!("/classes/{class_id}"))
        .json(&json!({ "name": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    let renamed: Value = server
        .patch(&format!("/classes/{class_id}"))
        .json(&json!({ "schedule": "TTh 9am" }))
        .await
        .json();
    assert_eq!(renamed["name"], "Math");
    assert_eq!(renamed["schedule"], "TTh 9am");

    server
        .patch("/classes/missing")
        .json(&json!({ "name": "x" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_reject_student_with_bad_email() {
    let server = server();
    let class_id = create_class(&server, "Math").await;
    let resp = server
        .post("/students")
        .json(&json!({ "name": "Ann", "email": "nope", "classId": class_id }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["message"], "Valid email is required");
}

#[tokio::test]
async fn should_import_students_and_reject_bad_files() {
    let server = server();
    create_class(&server, "Math").await;

    let template = server.get("/students/import/template").await;
    template.assert_status_ok();
    assert!(template.text().contains(",Math,2024-01-15"));

    let summary: Value = server
        .post("/students/import")
        .text(template.text())
        .await
        .json();
    assert_eq!(summary, json!({ "imported": 3, "skipped": 0 }));

    let again = server.post("/students/import").text(template.text()).await;
    again.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = again.json();
    assert_eq!(body["kind"], "IMPORT_REJECTED");
    assert_eq!(
        body["errors"][0],
        "Line 2: Email already exists (john.doe@example.com)"
    );
}

#[tokio::test]
async fn should_list_students_of_a_class() {
    let server = server();
    let math = create_class(&server, "Math").await;
    let art = create_class(&server, "Art").await;
    for (email, class_id) in [("a@x.com", &math), ("b@x.com", &art)] {
        server
            .post("/students")
            .json(&json!({ "name": "S", "email": email, "classId": class_id, "enrollmentDate": "2024-01-15" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let students: Value = server.get(&format!("/classes/{math}/students")).await.json();

    assert_eq!(students.as_array().unwrap().len(), 1);
    assert_eq!(students[0]["email"], "a@x.com");
    assert_eq!(students[0]["enrollmentDate"], "2024-01-15");
}

// ── Attendance & reports ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_upsert_attendance_and_report_it() {
    let server = server();
    let class_id = create_class(&server, "Math").await;
    let student: Value = server
        .post("/students")
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "classId": class_id }))
        .await
        .json();
    let student_id = student["id"].as_str().unwrap();

    for status in ["present", "late"] {
        server
            .put("/attendance")
            .json(&json!({
                "studentId": student_id,
                "classId": class_id,
                "date": "2024-02-01",
                "status": status,
            }))
            .await
            .assert_status_ok();
    }

    let sheet: Value = server
        .get("/attendance")
        .add_query_param("date", "2024-02-01")
        .add_query_param("class_id", &class_id)
        .await
        .json();
    assert_eq!(sheet.as_array().unwrap().len(), 1);
    assert_eq!(sheet[0]["status"], "late");

    let range: Value = server
        .get("/attendance/range")
        .add_query_param("from", "2024-01-01")
        .add_query_param("to", "2024-01-31")
        .await
        .json();
    assert_eq!(range, json!([]));

    let report: Value = server.get("/reports").await.json();
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["summary"]["late"], 1);
    assert_eq!(report["summary"]["attendanceRate"], 0);
    assert_eq!(report["rows"][0]["studentName"], "Ann");

    let export = server.get("/reports/export").await;
    export.assert_status_ok();
    let disposition = export.header("content-disposition");
    assert!(
        disposition
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"attendance_report_")
    );
    assert_eq!(
        export.text(),
        "Date,Student Name,Email,Class,Status\n\"Feb 1, 2024\",Ann,ann@x.com,Math,Late\n"
    );
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_viewer_scoped_dashboard() {
    let server = server();
    let math = create_class(&server, "Math").await;
    create_class(&server, "Art").await;
    let student: Value = server
        .post("/students")
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "classId": math }))
        .await
        .json();
    server
        .put("/attendance")
        .json(&json!({
            "studentId": student["id"],
            "classId": math,
            "date": rollcall_core::clock::today(),
            "status": "present",
        }))
        .await
        .assert_status_ok();

    let all: Value = server.get("/dashboard").await.json();
    assert_eq!(all["classCount"], 2);
    assert_eq!(all["studentCount"], 1);
    assert_eq!(all["today"]["attendanceRate"], 100);
    assert_eq!(all["thisWeek"], 1);
    assert_eq!(all["recent"][0]["studentName"], "Ann");

    let teacher: Value = server
        .post("/users")
        .json(&json!({ "username": "teach", "password": "pw" }))
        .await
        .json();
    let scoped: Value = server
        .get("/dashboard")
        .add_query_param("viewer_id", teacher["id"].as_str().unwrap())
        .await
        .json();
    assert_eq!(scoped["classCount"], 0);
    assert_eq!(scoped["recordCount"], 0);
    assert_eq!(scoped["recent"], json!([]));
}
