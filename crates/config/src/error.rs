use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("admin API unavailable: {0}")]
    AdminUnavailable(String),

    #[error("failed to parse admin API response: {0}")]
    ParseError(String),

    #[error("no snapshot available and no documented default for {0}")]
    NoDefault(String),

    #[error("failed to load process settings: {0}")]
    Settings(String),
}

impl From<ConfigError> for assistant_core::CoreError {
    fn from(err: ConfigError) -> Self {
        assistant_core::CoreError::ConfigUnavailable(err.to_string())
    }
}
