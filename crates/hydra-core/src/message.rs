//! UMF message envelopes exchanged with the registry's transport.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Schema tag carried by every envelope.
pub const UMF_VERSION: &str = "UMF/1.4.6";

/// Route the CLI uses as the `from` address.
pub const CLI_ROUTE: &str = "hydra-cli:/";

/// Placeholder destination written by `message create`.
pub const TEMPLATE_TO: &str = "{serviceName here}:/";

/// A UMF message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique message id.
    pub mid: String,
    /// Creation time, RFC 3339 UTC with millisecond precision.
    pub timestamp: String,
    pub version: String,
    pub to: String,
    pub from: String,
    pub body: Value,
}

impl Envelope {
    /// Build a fresh envelope with a generated id and the current time.
    pub fn new(to: impl Into<String>, from: impl Into<String>, body: Value) -> Self {
        Self {
            mid: uuid::Uuid::now_v7().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: UMF_VERSION.to_string(),
            to: to.into(),
            from: from.into(),
            body,
        }
    }

    /// Template printed by `message create`: placeholder `to`, empty body.
    pub fn template() -> Self {
        Self::new(TEMPLATE_TO, CLI_ROUTE, Value::Object(Map::new()))
    }

    /// The envelope as a JSON object, fields in envelope order.
    pub fn to_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("mid".into(), Value::String(self.mid.clone()));
        map.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        map.insert("version".into(), Value::String(self.version.clone()));
        map.insert("to".into(), Value::String(self.to.clone()));
        map.insert("from".into(), Value::String(self.from.clone()));
        map.insert("body".into(), self.body.clone());
        map
    }
}

/// Read and parse a JSON file.
pub fn load_json_file(path: &Path) -> Result<Value, CoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CoreError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an outgoing message: the file must hold a JSON object, which is sent
/// as-is (it is the whole message, not just its body).
pub fn load_message_file(path: &Path) -> Result<Map<String, Value>, CoreError> {
    match load_json_file(path)? {
        Value::Object(map) => Ok(map),
        _ => Err(CoreError::NotAnObject(path.to_path_buf())),
    }
}
