//! Ingress HTTP endpoints (spec §6): the voice query endpoint, health,
//! metrics, and session inspection/export — grounded on the teacher's
//! `create_router`/CORS-layer pattern.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use assistant_core::ExportFormat;
use assistant_orchestrator::RequestInput;

use crate::error::ServerError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.read().server.cors_origins, state.settings.read().server.cors_enabled);

    let ingress = Router::new()
        .route("/query", post(query))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/export", get(export_session));

    let observability = Router::new().route("/health", get(health_check)).route("/ready", get(readiness_check)).route(
        "/metrics",
        get(metrics_handler),
    );

    let admin = crate::admin::router().layer(axum::middleware::from_fn_with_state(state.clone(), crate::auth::auth_middleware));

    Router::new()
        .merge(ingress)
        .merge(observability)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled — allowing all origins (not for production)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("no CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin, "invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::error!("all configured CORS origins are invalid, falling back to localhost");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    #[allow(dead_code)]
    mode: Option<String>,
    room: String,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    answer: String,
    intent: Option<assistant_core::IntentKind>,
    confidence: Option<f32>,
    citations: Vec<String>,
    request_id: String,
    session_id: String,
    processing_time_ms: u64,
    metadata: serde_json::Value,
}

async fn query(State(state): State<AppState>, Json(request): Json<QueryRequest>) -> Result<Json<QueryResponse>, ServerError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let input = RequestInput {
        session_id: request.session_id,
        audio: None,
        text: Some(request.query),
        zone: request.room,
        voice_profile: String::new(),
        wake_word: String::new(),
        want_audio: false,
    };

    let output = state.orchestrator.handle_request(input).await?;
    let processing_time_ms = output.latency.total_ms();

    Ok(Json(QueryResponse {
        answer: output.text,
        intent: output.intent,
        confidence: output.confidence,
        citations: Vec::new(),
        request_id,
        session_id: output.session_id,
        processing_time_ms,
        metadata: serde_json::json!({}),
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let active_sessions = state.sessions.active_session_count();
    crate::metrics::set_active_sessions(active_sessions);
    Json(serde_json::json!({ "status": "ready", "active_sessions": active_sessions }))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, state.metrics_handle.render())
}

async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let ids = state.sessions.list_ids();
    Json(serde_json::json!({ "sessions": ids, "count": ids.len() }))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, ServerError> {
    let summary = state.sessions.summary(&id).map_err(|_| ServerError::SessionNotFound)?;
    Ok(Json(summary))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.sessions.delete(&id).await;
    StatusCode::NO_CONTENT
}

fn parse_export_format(raw: &str) -> Result<ExportFormat, ServerError> {
    match raw {
        "structured" => Ok(ExportFormat::Structured),
        "plaintext" => Ok(ExportFormat::Plaintext),
        "marked-up" => Ok(ExportFormat::MarkedUp),
        other => Err(ServerError::InvalidRequest(format!("unknown export format '{other}'"))),
    }
}

async fn export_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, ServerError> {
    let format = params.get("format").map(String::as_str).unwrap_or("structured");
    let format = parse_export_format(format)?;
    state.sessions.export(&id, format).map_err(|_| ServerError::SessionNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_documented_export_format() {
        assert!(matches!(parse_export_format("structured"), Ok(ExportFormat::Structured)));
        assert!(matches!(parse_export_format("plaintext"), Ok(ExportFormat::Plaintext)));
        assert!(matches!(parse_export_format("marked-up"), Ok(ExportFormat::MarkedUp)));
        assert!(parse_export_format("xml").is_err());
    }
}
