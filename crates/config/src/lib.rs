//! Dynamic configuration substrate (spec §4.1): the Config Loader plus the
//! process bootstrap `Settings` it is wired into.

pub mod admin_client;
pub mod error;
pub mod loader;
pub mod settings;

pub use admin_client::{AdminApi, AdminWriter, HttpAdminClient};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    AdminApiConfig, AuthConfig, FactProviderConfig, Settings, ServerConfig, UpstreamConfig, load_settings,
};
