//! Caller origin allow-list.
//!
//! Requests carrying an `Origin` header outside the list are refused before
//! routing. Requests without `Origin` (same-origin, curl, server-to-server)
//! pass. An empty list allows everything.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::error::ErrorBody;

/// Origins allowed to call the API.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: origins
                .into_iter()
                .map(|o| o.as_ref().trim_end_matches('/').to_string())
                .collect(),
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|o| o == origin)
    }

    /// CORS headers for allowed origins.
    pub fn cors_layer(&self) -> CorsLayer {
        let base = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        if self.allowed.is_empty() {
            return base.allow_origin(AllowOrigin::any());
        }

        let origins: Vec<HeaderValue> = self
            .allowed
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid allowed origin {:?}", o);
                    None
                }
            })
            .collect();
        base.allow_origin(AllowOrigin::list(origins))
    }
}

/// Middleware rejecting requests from origins outside the policy.
pub async fn guard(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    match origin {
        Some(origin) if !policy.allows(&origin) => {
            warn!(origin = %origin, "Rejected request from origin outside the allow-list");
            let body = ErrorBody {
                message: "Not allowed by CORS",
                error: None,
            };
            (StatusCode::FORBIDDEN, Json(body)).into_response()
        }
        _ => next.run(request).await,
    }
}
