use tracing::info;

use rollcall_attendance::config::AttendanceConfig;
use rollcall_attendance::infra::backend::Backend;
use rollcall_attendance::router::build_router;
use rollcall_attendance::state::AppState;

#[tokio::main]
async fn main() {
    rollcall_core::tracing::init_tracing();

    let config = AttendanceConfig::from_env();

    let backend = Backend::from_config(&config)
        .await
        .expect("failed to initialise storage backend");

    let router = build_router(AppState::new(backend));
    let http_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("attendance service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
