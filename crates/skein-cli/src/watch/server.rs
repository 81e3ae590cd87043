//! Live report server.
//!
//! Serves the latest report as JSON at `/report` and pushes rebuild
//! events to clients via Server-Sent Events at `/events`. CORS is wide
//! open: the server is a local development tool.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::State,
    http::StatusCode,
    response::{sse, IntoResponse, Json, Sse},
    routing::get,
    Router,
};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

use crate::error::{CliError, Result};
use crate::watch::SharedState;

pub struct WatchServer {
    port: u16,
    state: SharedState,
}

impl WatchServer {
    pub fn new(port: u16, state: SharedState) -> Self {
        Self { port, state }
    }

    /// Bind and serve until the process exits.
    pub async fn start(self) -> Result<()> {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.port);
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| CliError::Server(format!("failed to bind to {addr}: {err}")))?;

        tracing::info!("report server listening on http://{addr}");

        axum::serve(listener, app)
            .await
            .map_err(|err| CliError::Server(format!("server error: {err}")))?;
        Ok(())
    }

    fn build_router(self) -> Router {
        Router::new()
            .route("/report", get(handle_report))
            .route("/events", get(handle_events))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state)
    }
}

/// Latest full report, or 503 while the first build is still running.
async fn handle_report(State(state): State<SharedState>) -> impl IntoResponse {
    match state.latest() {
        Some(report) => Json(report.as_ref().clone()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "analysis in progress").into_response(),
    }
}

/// SSE stream of rebuild events for one client.
async fn handle_events(
    State(state): State<SharedState>,
) -> Sse<impl tokio_stream::Stream<Item = std::result::Result<sse::Event, std::convert::Infallible>>>
{
    let (id, rx) = state.register_client();
    tracing::debug!(client = id, "sse client connected");

    let stream = ReceiverStream::new(rx).map(|data| Ok(sse::Event::default().data(data)));

    Sse::new(stream).keep_alive(
        sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}
