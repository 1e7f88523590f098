//! Admin mutation audit trail (spec §4.11: "every mutation produces an audit
//! record {actor, timestamp, entity, before, after}"), grounded on the
//! teacher's `AuditLogger`/`log_conversation_start` pattern — a thin
//! fire-and-forget wrapper so a logging backend outage never blocks the
//! mutation it's recording.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub entity: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, record: AuditRecord);
}

/// Default sink: structured log lines, consistent with the rest of the
/// pipeline's observability. A durable admin-audit store (if one exists)
/// is wired in its place by the binary.
pub struct TracingAuditLog;

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record(&self, record: AuditRecord) {
        tracing::info!(
            actor = %record.actor,
            entity = %record.entity,
            timestamp = %record.timestamp,
            before = %record.before.unwrap_or(Value::Null),
            after = %record.after.unwrap_or(Value::Null),
            "admin mutation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracing_sink_accepts_a_record_without_panicking() {
        let sink = TracingAuditLog;
        sink.record(AuditRecord {
            actor: "admin-1".to_string(),
            timestamp: Utc::now(),
            entity: "feature:redis_caching".to_string(),
            before: Some(serde_json::json!({"enabled": false})),
            after: Some(serde_json::json!({"enabled": true})),
        })
        .await;
    }
}
