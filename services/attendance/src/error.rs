use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::validation::ValidationError;

/// Attendance service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Username already exists")]
    UsernameTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Class not found")]
    ClassNotFound,
    #[error("Student not found")]
    StudentNotFound,
    #[error("Cannot delete admin accounts")]
    AdminAccountProtected,
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("Found {} error(s) in import", .0.len())]
    ImportRejected(Vec<String>),
    #[error("backend failure")]
    Backend(#[from] anyhow::Error),
}

impl AttendanceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ClassNotFound => "CLASS_NOT_FOUND",
            Self::StudentNotFound => "STUDENT_NOT_FOUND",
            Self::AdminAccountProtected => "ADMIN_ACCOUNT_PROTECTED",
            Self::Invalid(_) => "INVALID",
            Self::ImportRejected(_) => "IMPORT_REJECTED",
            Self::Backend(_) => "BACKEND",
        }
    }
}

impl IntoResponse for AttendanceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::UserNotFound | Self::ClassNotFound | Self::StudentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::AdminAccountProtected => StatusCode::FORBIDDEN,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::ImportRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Backend(ref e) = self {
            tracing::error!(error = %e, kind = "BACKEND", "backend failure");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::ImportRejected(ref errors) = self {
            body["errors"] = serde_json::json!(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}
