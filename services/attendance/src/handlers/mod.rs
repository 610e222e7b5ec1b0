pub mod attendance;
pub mod classes;
pub mod dashboard;
pub mod reports;
pub mod students;
pub mod users;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// `text/csv` download with the given file name.
pub(crate) fn csv_attachment(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}
