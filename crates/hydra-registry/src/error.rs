use hydra_core::RouteError;

/// Registry client errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unable to connect to registry store: {0}")]
    Connection(String),

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("store error: {0}")]
    Backend(String),

    #[error("service {0} is not available")]
    ServiceUnavailable(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Route(#[from] RouteError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
