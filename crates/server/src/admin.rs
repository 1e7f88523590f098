//! The dynamic admin-configuration surface (spec §4.11, §6): every mutating
//! handler forwards to the external admin backend through `AdminWriter`,
//! invalidates the matching `ConfigLoader` cache entry, and emits an audit
//! record — grounded on the teacher's `session.rs` handler style (thin
//! extractor-bound functions returning `Result<Json<_>, ServerError>`).

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use assistant_core::config_model::{
    ClarificationRule, ConfigKind, DeviceDisambiguationRule, DisambiguationEntry, LlmBackend,
};
use assistant_core::{ClarificationSettings, ConversationSettings};

use crate::audit::AuditRecord;
use crate::error::ServerError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/conversation/settings", get(get_conversation_settings).put(put_conversation_settings))
        .route("/api/conversation/clarification", get(get_clarification_settings).put(put_clarification_settings))
        .route("/api/conversation/clarification/types", get(list_clarification_types))
        .route("/api/conversation/clarification/types/:kind", put(put_clarification_type))
        .route(
            "/api/conversation/sports-teams",
            get(list_sports_teams).post(upsert_sports_team),
        )
        .route(
            "/api/conversation/sports-teams/:token",
            put(put_sports_team).delete(delete_sports_team),
        )
        .route("/api/conversation/device-rules", get(list_device_rules))
        .route("/api/conversation/device-rules/:kind", put(put_device_rule))
        .route("/api/features", get(list_features))
        .route("/api/features/impact", get(features_impact))
        .route("/api/features/:id/toggle", put(toggle_feature))
        .route("/api/llm-backends", get(list_llm_backends).post(create_llm_backend))
        .route(
            "/api/llm-backends/model/:model_name",
            get(get_llm_backend).put(update_llm_backend).delete(delete_llm_backend),
        )
        .route("/api/conversation/analytics", get(analytics_events))
        .route("/api/conversation/analytics/summary", get(analytics_summary))
}

async fn audit(state: &AppState, actor: &str, entity: &str, before: Option<serde_json::Value>, after: Option<serde_json::Value>) {
    state
        .audit
        .record(AuditRecord { actor: actor.to_string(), timestamp: chrono::Utc::now(), entity: entity.to_string(), before, after })
        .await;
}

async fn get_conversation_settings(State(state): State<AppState>) -> Json<ConversationSettings> {
    Json(state.config.conversation_settings().await)
}

async fn put_conversation_settings(
    State(state): State<AppState>,
    Json(settings): Json<ConversationSettings>,
) -> Result<Json<ConversationSettings>, ServerError> {
    let before = state.config.conversation_settings().await;
    state.admin_writer.update_conversation_settings(&settings).await?;
    state.config.invalidate(ConfigKind::ConversationSettings);
    audit(&state, "admin", "conversation_settings", Some(json!(before)), Some(json!(settings))).await;
    Ok(Json(settings))
}

async fn get_clarification_settings(State(state): State<AppState>) -> Json<ClarificationSettings> {
    Json(state.config.clarification_settings().await)
}

async fn put_clarification_settings(
    State(state): State<AppState>,
    Json(settings): Json<ClarificationSettings>,
) -> Result<Json<ClarificationSettings>, ServerError> {
    let before = state.config.clarification_settings().await;
    state.admin_writer.update_clarification_settings(&settings).await?;
    state.config.invalidate(ConfigKind::ClarificationSettings);
    audit(&state, "admin", "clarification_settings", Some(json!(before)), Some(json!(settings))).await;
    Ok(Json(settings))
}

async fn list_clarification_types(State(state): State<AppState>) -> Json<Vec<ClarificationRule>> {
    Json(state.config.clarification_rules().await)
}

async fn put_clarification_type(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(mut rule): Json<ClarificationRule>,
) -> Result<Json<ClarificationRule>, ServerError> {
    rule.kind = kind;
    state.admin_writer.upsert_clarification_rule(&rule).await?;
    state.config.invalidate(ConfigKind::ClarificationRules);
    audit(&state, "admin", &format!("clarification_rule:{}", rule.kind), None, Some(json!(rule))).await;
    Ok(Json(rule))
}

async fn list_sports_teams(State(state): State<AppState>) -> Json<Vec<DisambiguationEntry>> {
    Json(state.config.sports_disambiguation().await)
}

async fn upsert_sports_team(
    State(state): State<AppState>,
    Json(entry): Json<DisambiguationEntry>,
) -> Result<Json<DisambiguationEntry>, ServerError> {
    state.admin_writer.upsert_sports_team(&entry).await?;
    state.config.invalidate(ConfigKind::SportsDisambiguation);
    audit(&state, "admin", &format!("sports_team:{}", entry.trigger_token), None, Some(json!(entry))).await;
    Ok(Json(entry))
}

async fn put_sports_team(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(mut entry): Json<DisambiguationEntry>,
) -> Result<Json<DisambiguationEntry>, ServerError> {
    entry.trigger_token = token;
    state.admin_writer.upsert_sports_team(&entry).await?;
    state.config.invalidate(ConfigKind::SportsDisambiguation);
    audit(&state, "admin", &format!("sports_team:{}", entry.trigger_token), None, Some(json!(entry))).await;
    Ok(Json(entry))
}

async fn delete_sports_team(State(state): State<AppState>, Path(token): Path<String>) -> Result<(), ServerError> {
    state.admin_writer.delete_sports_team(&token).await?;
    state.config.invalidate(ConfigKind::SportsDisambiguation);
    audit(&state, "admin", &format!("sports_team:{token}"), None, None).await;
    Ok(())
}

async fn list_device_rules(State(state): State<AppState>) -> Json<Vec<DeviceDisambiguationRule>> {
    Json(state.config.device_rules().await)
}

async fn put_device_rule(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(mut rule): Json<DeviceDisambiguationRule>,
) -> Result<Json<DeviceDisambiguationRule>, ServerError> {
    rule.device_kind = kind;
    state.admin_writer.update_device_rule(&rule).await?;
    state.config.invalidate(ConfigKind::DeviceRules);
    audit(&state, "admin", &format!("device_rule:{}", rule.device_kind), None, Some(json!(rule))).await;
    Ok(Json(rule))
}

async fn list_features(State(state): State<AppState>) -> Json<Vec<assistant_core::FeatureFlag>> {
    Json(state.config.features().await)
}

#[derive(Debug, Deserialize)]
struct TogglePayload {
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct FeatureImpact {
    name: String,
    avg_latency_ms: Option<f64>,
    hit_rate: Option<f64>,
    required: bool,
}

async fn features_impact(State(state): State<AppState>) -> Json<Vec<FeatureImpact>> {
    let impact = state
        .config
        .features()
        .await
        .into_iter()
        .map(|flag| FeatureImpact { name: flag.name, avg_latency_ms: flag.avg_latency_ms, hit_rate: flag.hit_rate, required: flag.required })
        .collect();
    Json(impact)
}

async fn toggle_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TogglePayload>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let existing = state.config.features().await.into_iter().find(|flag| flag.name == id);
    if let Some(flag) = &existing {
        if flag.required && !payload.enabled {
            return Err(ServerError::InvalidRequest(format!("feature '{id}' is required and cannot be disabled")));
        }
    }
    state.admin_writer.toggle_feature(&id, payload.enabled).await?;
    state.config.invalidate(ConfigKind::Features);
    audit(&state, "admin", &format!("feature:{id}"), existing.map(|f| json!(f.enabled)), Some(json!(payload.enabled))).await;
    Ok(Json(json!({ "name": id, "enabled": payload.enabled })))
}

async fn list_llm_backends(State(state): State<AppState>) -> Json<Vec<LlmBackend>> {
    Json(state.config.llm_backends().await)
}

async fn get_llm_backend(State(state): State<AppState>, Path(model_name): Path<String>) -> Json<LlmBackend> {
    Json(state.config.llm_backend(&model_name).await)
}

async fn create_llm_backend(
    State(state): State<AppState>,
    Json(backend): Json<LlmBackend>,
) -> Result<Json<LlmBackend>, ServerError> {
    state.admin_writer.upsert_llm_backend(&backend).await?;
    state.config.invalidate(ConfigKind::LlmBackends);
    audit(&state, "admin", &format!("llm_backend:{}", backend.model_name), None, Some(json!(backend))).await;
    Ok(Json(backend))
}

async fn update_llm_backend(
    State(state): State<AppState>,
    Path(model_name): Path<String>,
    Json(mut backend): Json<LlmBackend>,
) -> Result<Json<LlmBackend>, ServerError> {
    backend.model_name = model_name;
    state.admin_writer.upsert_llm_backend(&backend).await?;
    state.config.invalidate(ConfigKind::LlmBackends);
    audit(&state, "admin", &format!("llm_backend:{}", backend.model_name), None, Some(json!(backend))).await;
    Ok(Json(backend))
}

async fn delete_llm_backend(State(state): State<AppState>, Path(model_name): Path<String>) -> Result<(), ServerError> {
    state.admin_writer.delete_llm_backend(&model_name).await?;
    state.config.invalidate(ConfigKind::LlmBackends);
    audit(&state, "admin", &format!("llm_backend:{model_name}"), None, None).await;
    Ok(())
}

async fn analytics_events(State(state): State<AppState>) -> Json<Vec<assistant_core::AnalyticsEvent>> {
    Json(state.analytics.recent(200))
}

async fn analytics_summary(State(state): State<AppState>) -> Json<assistant_orchestrator::AnalyticsSummary> {
    Json(state.analytics.summary())
}
