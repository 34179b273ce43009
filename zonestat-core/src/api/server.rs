use crate::api::handler::StatsHandler;
use crate::server::ShutdownSignal;
use axum::Router;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::{Method, Uri};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Every request goes through [`StatsHandler`]; routing is its own table.
pub fn router(handler: Arc<StatsHandler>) -> Router {
    Router::new().fallback(dispatch).with_state(handler)
}

async fn dispatch(State(handler): State<Arc<StatsHandler>>, method: Method, uri: Uri) -> Response {
    handler.handle(&method, uri.path()).await.into_response()
}

/// Serve until `shutdown` fires, then stop accepting and let in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    handler: Arc<StatsHandler>,
    mut shutdown: ShutdownSignal,
) -> std::io::Result<()> {
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async move { shutdown.triggered().await })
        .await
}
