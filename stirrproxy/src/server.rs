use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::cache::SnapshotCache;
use crate::models::Snapshot;
use crate::render;
use crate::scheduler::ShutdownReceiver;

#[derive(Clone)]
struct AppState {
    cache: Arc<SnapshotCache>,
}

impl AppState {
    /**
        Current snapshot, or a 503 if nothing has been loaded yet.

        The server is only started after the first refresh succeeded,
        so the error branch is not expected to be hit in practice.
    */
    fn snapshot(&self) -> Result<Arc<Snapshot>, Response> {
        self.cache.read().ok_or_else(|| {
            tracing::warn!("Request served before the first refresh completed");
            (StatusCode::SERVICE_UNAVAILABLE, "Channel lineup not loaded yet").into_response()
        })
    }
}

async fn playlist_m3u(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let guide_url = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("http://{host}/epg.xml"));

    let playlist = render::render_playlist(&snapshot, guide_url.as_deref());

    ([(header::CONTENT_TYPE, "audio/x-mpegurl")], playlist).into_response()
}

async fn epg_xml(State(state): State<AppState>) -> Response {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    match render::render_guide(&snapshot) {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render guide");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn index(State(state): State<AppState>) -> Response {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let html = render::render_status_page(&snapshot);

    ([(header::CONTENT_TYPE, "text/html")], html).into_response()
}

fn router(cache: Arc<SnapshotCache>) -> Router {
    Router::new()
        .route("/playlist.m3u", get(playlist_m3u))
        .route("/epg.xml", get(epg_xml))
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { cache })
}

/**
    Run the HTTP server that serves the playlist, guide, and status page.
*/
pub async fn run_server(
    addr: SocketAddr,
    cache: Arc<SnapshotCache>,
    mut shutdown_rx: ShutdownReceiver,
) -> anyhow::Result<()> {
    let app = router(cache);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Now accepting requests on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Wait for shutdown signal
            while !*shutdown_rx.borrow_and_update() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}
