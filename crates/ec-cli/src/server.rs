//! HTTP snapshot endpoint.
//!
//! `GET /clock` returns the latest published [`Snapshot`] as JSON. The tick
//! task is the only writer; handlers read through a `watch::Receiver`, so a
//! response never mixes the time of one tick with the stretch of another.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ec_core::Snapshot;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    snapshots: watch::Receiver<Option<Snapshot>>,
}

pub fn build_router(snapshots: watch::Receiver<Option<Snapshot>>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/clock", get(get_clock))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { snapshots })
}

async fn get_clock(State(state): State<AppState>) -> Response {
    let latest = state.snapshots.borrow().clone();
    match latest {
        Some(snapshot) => Json(snapshot).into_response(),
        None => {
            let body = serde_json::json!({
                "error": "clock has not ticked yet",
                "status": StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

/// Serve `router` on `listener` until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "snapshot server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
