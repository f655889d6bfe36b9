//! Mimikyu board server
//!
//! Holds the authoritative board in memory and relays it to every connected
//! client after each edit.
//!
//! ## Protocol
//!
//! Clients send one JSON command per message:
//! ```json
//! { "mode": "Draw", "x": 0, "y": 1, "color": "rgb(255,0,0)" }
//! ```
//! and receive the whole board as rows of packed colors:
//! ```json
//! [[0, 16711680], [0, 0]]
//! ```

pub mod board;
pub mod config;
pub mod realtime;
pub mod state;

pub use board::{ApplyError, Board};
pub use config::ServerConfig;
pub use state::AppState;

use axum::{Router, routing::get};
use mimikyu_core::config::DEFAULT_ENDPOINT_PATH;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(DEFAULT_ENDPOINT_PATH, get(realtime::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then clear the board.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Exiting mimikyu server...");
    state.clear().await;
    Ok(())
}

/// Index page
async fn index() -> &'static str {
    "Mimikyu board server - connect via WebSocket at /realtime/draw"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mimikyu_core::{EditCommand, GridConfig, Rgb, Snapshot};
    use tower::util::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::new(GridConfig::new(2, 2).unwrap(), 4)))
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_route() {
        assert_eq!(get_text(app(), "/health").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn test_index_route_points_at_stream() {
        let (status, body) = get_text(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(DEFAULT_ENDPOINT_PATH));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, _) = get_text(app(), "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_shutdown_clears_board() {
        let state = Arc::new(AppState::new(GridConfig::new(1, 2).unwrap(), 4));
        state.apply(&EditCommand::draw(0, 1, Rgb::WHITE)).await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state.clone(), async move {
            let _ = stopped.await;
        }));

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert_eq!(state.snapshot().await, Snapshot::empty(1, 2));
    }
}
