use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("external store unavailable: {0}")]
    ExternalUnavailable(String),

    #[error("disk spill unavailable: {0}")]
    DiskUnavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
