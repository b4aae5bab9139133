//! HTTP handlers for the GraphQL gateway.

use crate::startup::AppState;
use async_graphql::{Request as GraphqlRequest, Variables};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// Inbound GraphQL envelope: the document text plus optional variables.
#[derive(Debug, Deserialize)]
pub struct GraphqlEnvelope {
    pub query: String,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
}

/// `POST /` — execute one GraphQL document against the relay schema.
///
/// The body is read raw and parsed by hand: a malformed envelope must produce
/// a 500 with a generic JSON error, not an extractor rejection.
pub async fn graphql(State(state): State<AppState>, body: Bytes) -> Response {
    let envelope: GraphqlEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse GraphQL envelope");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "GraphQL 执行失败" })),
            )
                .into_response();
        }
    };

    let mut request = GraphqlRequest::new(envelope.query);
    if let Some(variables) = envelope.variables {
        request = request.variables(Variables::from_json(variables));
    }

    let result = state.schema.execute(request).await;

    match serde_json::to_string(&result) {
        Ok(raw) => tracing::debug!(result = %raw, "GraphQL execution result"),
        Err(e) => tracing::debug!(error = %e, "Failed to serialize GraphQL result for logging"),
    }

    (StatusCode::OK, Json(result)).into_response()
}

/// `OPTIONS /` — CORS preflight. Headers are attached by the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Fallback for every other method and path; doubles as the readiness signal.
pub async fn ready() -> &'static str {
    "GraphQL endpoint ready"
}
