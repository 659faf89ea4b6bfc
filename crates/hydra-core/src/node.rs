//! Service node records as published by running services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field the CLI adds when listing nodes.
pub const ELAPSED_FIELD: &str = "elapsed";

/// One running service instance, as stored under the nodes hash.
///
/// The record is kept as the JSON object the service published, in its
/// original field order. Declared fields are read leniently: a field with an
/// unexpected type reads as absent rather than rejecting the node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceNode(Map<String, Value>);

impl ServiceNode {
    /// Wrap a node record. Anything but a JSON object is not a node.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn service_name(&self) -> &str {
        self.str_field("serviceName").unwrap_or_default()
    }

    pub fn service_ip(&self) -> Option<&str> {
        self.str_field("serviceIP").filter(|ip| !ip.is_empty())
    }

    /// Port as a JSON number or a numeric string.
    pub fn service_port(&self) -> Option<u16> {
        match self.0.get("servicePort")? {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn updated_on(&self) -> Option<&str> {
        self.str_field("updatedOn")
    }

    /// Seconds since `updatedOn`, once filled in by [`ServiceNode::with_elapsed`].
    pub fn elapsed(&self) -> Option<i64> {
        self.0.get(ELAPSED_FIELD).and_then(Value::as_i64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether the node's service name contains `filter` (case-sensitive).
    pub fn matches(&self, filter: &str) -> bool {
        self.service_name().contains(filter)
    }

    /// Attach the whole seconds elapsed since the node last updated.
    ///
    /// A missing or unparseable `updatedOn` leaves the record unchanged.
    pub fn with_elapsed(mut self, now: DateTime<Utc>) -> Self {
        if let Some(elapsed) = self.updated_on().and_then(|updated| elapsed_seconds(updated, now)) {
            self.0.insert(ELAPSED_FIELD.to_string(), Value::from(elapsed));
        }
        self
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Whole seconds between an RFC 3339 timestamp and `now`, rounded down.
pub fn elapsed_seconds(updated_on: &str, now: DateTime<Utc>) -> Option<i64> {
    let updated = DateTime::parse_from_rfc3339(updated_on).ok()?;
    let millis = now
        .signed_duration_since(updated.with_timezone(&Utc))
        .num_milliseconds();
    Some(millis.div_euclid(1000))
}
