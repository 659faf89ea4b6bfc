//! Per-user config file holding the registry store connection parameters.
//!
//! The file is a single JSON object. Only `redisUrl`, `redisPort` and
//! `redisDb` are interpreted; every other field is carried through untouched
//! so that reconfiguring never drops settings written by other tools.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::CoreError;

/// File name of the config file inside the user's home directory.
pub const CONFIG_FILE_NAME: &str = ".hydra-cli";

/// Config key holding the store host.
pub const KEY_STORE_HOST: &str = "redisUrl";
/// Config key holding the store port.
pub const KEY_STORE_PORT: &str = "redisPort";
/// Config key holding the logical database index.
pub const KEY_STORE_DB: &str = "redisDb";

/// Keys prompted for by `hydra-cli config`, in prompt order.
pub const PROMPTED_KEYS: [&str; 3] = [KEY_STORE_HOST, KEY_STORE_PORT, KEY_STORE_DB];

/// Default location of the config file: `~/.hydra-cli`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// The loaded config object together with the path it was read from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Load the config file, tolerating absence and corruption.
    ///
    /// A missing, unreadable or non-object file yields an empty
    /// ("unconfigured") store; store-dependent commands then fail with
    /// [`CoreError::Unconfigured`] rather than at startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "config file is not a JSON object, ignoring");
                    Map::new()
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "config file is corrupt, ignoring");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                Map::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unable to read config file");
                Map::new()
            }
        };
        Self { path, values }
    }

    /// Path the config was loaded from and will be saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw config object.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a field, keeping its position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Whether the store host has been configured.
    pub fn is_configured(&self) -> bool {
        matches!(self.values.get(KEY_STORE_HOST), Some(Value::String(s)) if !s.is_empty())
    }

    /// Persist the config object as pretty JSON, creating parent directories.
    pub fn save(&self) -> Result<(), CoreError> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| CoreError::ConfigWrite {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, contents).map_err(|source| CoreError::ConfigWrite {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Typed connection parameters for the registry store.
    pub fn store_settings(&self) -> Result<StoreSettings, CoreError> {
        let host = match self.values.get(KEY_STORE_HOST) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(CoreError::Unconfigured(format!("missing {KEY_STORE_HOST}"))),
        };
        let port = integer_field(&self.values, KEY_STORE_PORT)?;
        let port = u16::try_from(port).map_err(|_| CoreError::InvalidConfigValue {
            field: KEY_STORE_PORT,
            value: port.to_string(),
        })?;
        let db = integer_field(&self.values, KEY_STORE_DB)?;
        Ok(StoreSettings { host, port, db })
    }
}

/// Read an integer that may have been stored either as a JSON number or as
/// the string typed at the config prompt.
fn integer_field(values: &Map<String, Value>, field: &'static str) -> Result<i64, CoreError> {
    match values.get(field) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| CoreError::InvalidConfigValue {
            field,
            value: n.to_string(),
        }),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            s.trim()
                .parse::<i64>()
                .map_err(|_| CoreError::InvalidConfigValue {
                    field,
                    value: s.clone(),
                })
        }
        _ => Err(CoreError::Unconfigured(format!("missing {field}"))),
    }
}

/// Connection parameters for the registry's key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

impl StoreSettings {
    /// Connection URL in `redis://host:port/db` form.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}
