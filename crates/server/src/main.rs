//! Process entry point: loads settings, wires every crate's collaborator
//! into the shared `AppState`, and serves the HTTP surface — grounded on
//! the teacher's `main.rs` bootstrap sequence (settings → stores → router →
//! graceful-shutdown serve).

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::signal;

use assistant_cache::{CacheTier, DiskStore, ExternalStore, InMemoryExternalStore, NullDiskStore, RedisExternalStore, SledDiskStore};
use assistant_config::{load_settings, AdminWriter, ConfigLoader, HttpAdminClient};
use assistant_core::config_model::feature_names;
use assistant_core::FacadeHandler;
use assistant_handlers::build_registry;
use assistant_homecontrol::HomeControlClient;
use assistant_llm::LlmRouter;
use assistant_orchestrator::{InMemoryAnalyticsStore, Orchestrator, SttClient, TtsClient};
use assistant_server::state::AppState;
use assistant_server::{audit::TracingAuditLog, create_router, metrics};
use assistant_session::{spawn_reaper, SessionStore};

const MEMORY_CACHE_CAPACITY: usize = 10_000;
const ANALYTICS_RING_CAPACITY: usize = 5_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let settings = load_settings(std::env::var("ASSISTANT_CONFIG_PATH").ok().as_deref())?;

    let admin_client = Arc::new(HttpAdminClient::new(settings.admin_api.clone())?);
    let admin_writer: Arc<dyn AdminWriter> = admin_client.clone();
    let config = Arc::new(ConfigLoader::new(admin_client.clone(), Arc::new(InMemoryExternalStore::new()), settings.admin_api.cache_ttl_seconds));

    // Probe the feature flag before any request arrives so the choice of
    // external store is made once at startup, not per-request (spec §4.2).
    let redis_caching_enabled = config.is_feature_enabled(feature_names::REDIS_CACHING).await;
    let external_store: Arc<dyn ExternalStore> = match (&settings.upstream.external_kv_url, redis_caching_enabled) {
        (Some(url), true) => match RedisExternalStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(err) => {
                tracing::error!(%err, "failed to connect to redis, falling back to in-process cache store");
                Arc::new(InMemoryExternalStore::new())
            }
        },
        _ => Arc::new(InMemoryExternalStore::new()),
    };

    let disk_store: Arc<dyn DiskStore> = match &settings.upstream.disk_spill_path {
        Some(path) => match SledDiskStore::open(path) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                tracing::error!(%err, "failed to open disk spill store, disk tier disabled");
                Arc::new(NullDiskStore)
            }
        },
        None => Arc::new(NullDiskStore),
    };

    let cache = Arc::new(CacheTier::new(MEMORY_CACHE_CAPACITY, external_store.clone(), disk_store));

    let sessions = Arc::new(SessionStore::new(external_store.clone(), config.clone()));
    let conversation_settings = config.conversation_settings().await;
    let _reaper_shutdown = spawn_reaper(sessions.clone(), conversation_settings.cleanup_interval_seconds, conversation_settings.timeout_seconds);

    let handlers: std::collections::HashMap<&'static str, Arc<dyn FacadeHandler>> =
        build_registry(cache.clone(), settings.upstream.fact_provider.clone());

    let llm = Arc::new(LlmRouter::new(config.clone())?);
    let homecontrol_client = Arc::new(HomeControlClient::new(settings.upstream.control_plane_url.clone()));
    let stt = SttClient::new(settings.upstream.stt_url.clone());
    let tts = TtsClient::new(settings.upstream.tts_url.clone());

    let analytics = Arc::new(InMemoryAnalyticsStore::new(ANALYTICS_RING_CAPACITY));

    let orchestrator = Arc::new(Orchestrator::new(
        config.clone(),
        sessions.clone(),
        handlers,
        llm,
        homecontrol_client,
        stt,
        tts,
        analytics.clone(),
        cache,
    ));

    let metrics_handle = metrics::install_recorder();

    let state = AppState {
        settings: Arc::new(RwLock::new(settings.clone())),
        orchestrator,
        sessions,
        config,
        admin_writer,
        audit: Arc::new(TracingAuditLog),
        analytics,
        metrics_handle,
    };

    let router = create_router(state);
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "assistant-server listening");
    metrics::log_bound_address(addr);

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
