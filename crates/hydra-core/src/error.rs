use std::path::PathBuf;

use crate::route::RouteError;

/// Core errors: config file handling, message files, route parsing.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("store is not configured: {0} (run `hydra-cli config`)")]
    Unconfigured(String),

    #[error("invalid config value for {field}: {value}")]
    InvalidConfigValue { field: &'static str, value: String },

    #[error("unable to write config file {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} does not contain a JSON object")]
    NotAnObject(PathBuf),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Route(#[from] RouteError),
}
