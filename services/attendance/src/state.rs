use crate::api::DataApi;
use crate::infra::backend::Backend;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub api: DataApi<Backend>,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self {
            api: DataApi::new(backend),
        }
    }
}
