use crate::api::endpoint::StatsEndpoint;
use crate::zone::{ZoneHandle, ZoneRegistry};
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, Method, StatusCode, header};
use std::time::Duration;

/// Upper bound on waiting for one zone to acknowledge a reset.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(2);

const NOT_FOUND_BODY: &[u8] = b"not found";

/// A fully rendered response. Kept independent of the HTTP server so the
/// routing and reset logic can be exercised directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsResponse {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub allow: Option<&'static str>,
    /// Always the length of the GET representation, including for HEAD.
    pub content_length: usize,
    pub body: Vec<u8>,
}

impl StatsResponse {
    fn json(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some("application/json"),
            allow: None,
            content_length: body.len(),
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            content_type: Some("text/plain"),
            allow: None,
            content_length: NOT_FOUND_BODY.len(),
            body: NOT_FOUND_BODY.to_vec(),
        }
    }

    fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            content_type: None,
            allow: Some("GET, HEAD"),
            content_length: 0,
            body: Vec::new(),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: None,
            allow: None,
            content_length: 0,
            body: Vec::new(),
        }
    }

    fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }
}

impl IntoResponse for StatsResponse {
    fn into_response(self) -> Response {
        let mut resp = Response::new(Body::from(self.body));
        *resp.status_mut() = self.status;

        let headers = resp.headers_mut();
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if let Some(allow) = self.allow {
            headers.insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.content_length));

        resp
    }
}

pub struct StatsHandler {
    registry: ZoneRegistry,
    zones: Vec<ZoneHandle>,
    reset_timeout: Duration,
}

impl StatsHandler {
    pub fn new(registry: ZoneRegistry, zones: Vec<ZoneHandle>) -> Self {
        Self {
            registry,
            zones,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }

    pub fn with_reset_timeout(mut self, reset_timeout: Duration) -> Self {
        self.reset_timeout = reset_timeout;
        self
    }

    pub async fn handle(&self, method: &Method, path: &str) -> StatsResponse {
        let Ok(endpoint) = path.parse::<StatsEndpoint>() else {
            return StatsResponse::not_found();
        };

        let head = match *method {
            Method::GET => false,
            Method::HEAD => true,
            _ => return StatsResponse::method_not_allowed(),
        };

        if let Some(children) = endpoint.children() {
            let resp = match serde_json::to_vec(children) {
                Ok(body) => StatsResponse::json(body),
                Err(e) => {
                    tracing::error!(error = %e, "json serialization failed");
                    StatsResponse::internal_error()
                }
            };
            return if head { resp.without_body() } else { resp };
        }

        let body = match serde_json::to_vec(&self.registry.snapshot()) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "json serialization failed");
                return StatsResponse::internal_error();
            }
        };

        if head {
            return StatsResponse::json(body).without_body();
        }

        self.reset_all().await;
        StatsResponse::json(body)
    }

    /// Reset every zone and wait for the acknowledgements.
    ///
    /// Runs on its own task so a client hanging up mid-request cannot leave
    /// some zones reset and others not.
    async fn reset_all(&self) {
        let zones = self.zones.clone();
        let reset_timeout = self.reset_timeout;

        let task = tokio::spawn(async move {
            for zone in &zones {
                match tokio::time::timeout(reset_timeout, zone.reset()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!(error = %e, "counter reset skipped"),
                    Err(_) => tracing::warn!(
                        zone = zone.name(),
                        timeout_ms = reset_timeout.as_millis() as u64,
                        "timed out waiting for counter reset"
                    ),
                }
            }
        });

        if let Err(e) = task.await {
            tracing::error!(error = %e, "counter reset task failed");
        }
    }
}
