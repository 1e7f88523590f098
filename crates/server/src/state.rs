//! Shared application state across all handlers, grounded on the teacher's
//! `AppState` (config behind a lock for the synchronous auth-middleware
//! read, the rest behind plain `Arc`s).

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;

use assistant_config::{ConfigLoader, Settings};
use assistant_orchestrator::{InMemoryAnalyticsStore, Orchestrator};
use assistant_session::SessionStore;

use crate::audit::AuditLog;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<Settings>>,
    pub orchestrator: Arc<Orchestrator>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<ConfigLoader>,
    pub admin_writer: Arc<dyn assistant_config::AdminWriter>,
    pub audit: Arc<dyn AuditLog>,
    pub analytics: Arc<InMemoryAnalyticsStore>,
    pub metrics_handle: PrometheusHandle,
}
