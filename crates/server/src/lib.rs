//! The HTTP ingress/admin surface (spec §4.11, §6): binds the orchestrator,
//! session store, and dynamic admin configuration behind axum, grounded on
//! the teacher's `voice-agent-rust` server crate layout.

pub mod admin;
pub mod audit;
pub mod auth;
pub mod error;
pub mod http;
pub mod metrics;
pub mod state;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;
