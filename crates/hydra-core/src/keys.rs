//! Registry key layout in the backing store.
//!
//! All keys share the `hydra:service` prefix:
//!
//! | Key | Type |
//! |---|---|
//! | `hydra:service:nodes` | hash, field = instance id, value = node JSON |
//! | `hydra:service:<service>:service:routes` | set of route patterns |
//! | `hydra:service:<service>:<instance>:health:log` | list of health JSON |
//! | `hydra:service:<service>:<instance>:presence` | string with TTL |
//! | `hydra:service:mc:<service>[:<instance>]` | pub/sub channel |

/// Prefix shared by every registry key.
pub const PREFIX: &str = "hydra:service";

/// Hash of all known service nodes.
pub const NODES_HASH: &str = "hydra:service:nodes";

/// Number of health log entries read per instance (`LRANGE 0 100`).
pub const HEALTH_LOG_ENTRIES: isize = 101;

/// Route set key for one service.
pub fn routes_key(service_name: &str) -> String {
    format!("{PREFIX}:{service_name}:service:routes")
}

/// Pattern matching the route set of every service.
pub fn routes_pattern() -> String {
    routes_key("*")
}

/// Extract the service name from a route set key.
///
/// Returns `None` for keys that do not follow the route set layout.
pub fn service_from_routes_key(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(PREFIX)?.strip_prefix(':')?;
    let name = rest.strip_suffix(":service:routes")?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Pattern matching the health log of every instance of a service.
pub fn health_log_pattern(service_name: &str) -> String {
    format!("*:{service_name}:*:health:log")
}

/// Pattern matching the presence key of every live instance of a service.
pub fn presence_pattern(service_name: &str) -> String {
    format!("{PREFIX}:{service_name}:*:presence")
}

/// Extract the instance id from a presence key of the given service.
pub fn instance_from_presence_key<'a>(service_name: &str, key: &'a str) -> Option<&'a str> {
    let id = key
        .strip_prefix(PREFIX)?
        .strip_prefix(':')?
        .strip_prefix(service_name)?
        .strip_prefix(':')?
        .strip_suffix(":presence")?;
    if id.is_empty() || id.contains(':') {
        None
    } else {
        Some(id)
    }
}

/// Pub/sub channel a service (or one of its instances) listens on.
pub fn message_channel(service_name: &str, instance: Option<&str>) -> String {
    match instance {
        Some(id) => format!("{PREFIX}:mc:{service_name}:{id}"),
        None => format!("{PREFIX}:mc:{service_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_key_layout() {
        assert_eq!(routes_key("users"), "hydra:service:users:service:routes");
        assert_eq!(routes_pattern(), "hydra:service:*:service:routes");
    }

    #[test]
    fn test_service_from_routes_key() {
        assert_eq!(
            service_from_routes_key("hydra:service:users:service:routes"),
            Some("users")
        );
        assert_eq!(service_from_routes_key("hydra:service:nodes"), None);
        assert_eq!(service_from_routes_key("hydra:service::service:routes"), None);
        assert_eq!(service_from_routes_key("other:users:service:routes"), None);
    }

    #[test]
    fn test_presence_key_parsing() {
        assert_eq!(presence_pattern("users"), "hydra:service:users:*:presence");
        assert_eq!(
            instance_from_presence_key("users", "hydra:service:users:abc123:presence"),
            Some("abc123")
        );
        assert_eq!(
            instance_from_presence_key("users", "hydra:service:orders:abc123:presence"),
            None
        );
    }

    #[test]
    fn test_health_log_pattern() {
        assert_eq!(health_log_pattern("users"), "*:users:*:health:log");
    }

    #[test]
    fn test_message_channel() {
        assert_eq!(message_channel("users", None), "hydra:service:mc:users");
        assert_eq!(
            message_channel("users", Some("abc")),
            "hydra:service:mc:users:abc"
        );
    }
}
