//! Outbound message and API-request transport.
//!
//! Messages are published on the registry's pub/sub channels; API requests
//! are forwarded over HTTP to an instance of the addressed service found in
//! the nodes hash.

use hydra_core::keys;
use hydra_core::{parse_route, Envelope, Method, Route, ServiceNode};
use serde_json::{json, Map, Value};

use crate::error::{RegistryError, Result};
use crate::registry::Registry;
use crate::store::RegistryStore;

/// Publish a message object to the service named in its `to` route.
///
/// A route naming an instance goes to that instance's channel. Otherwise the
/// first instance with a live presence key is used, falling back to the
/// service-wide channel. Returns the channel published to.
pub async fn send_message<S: RegistryStore>(
    registry: &Registry<S>,
    message: &Map<String, Value>,
) -> Result<String> {
    let to = message
        .get("to")
        .and_then(Value::as_str)
        .ok_or_else(|| RegistryError::InvalidMessage("missing `to` route".into()))?;
    let route = parse_route(to)?;

    let channel = match &route.instance {
        Some(instance) => keys::message_channel(&route.service_name, Some(instance)),
        None => {
            let instances = registry.find_service_instances(&route.service_name).await;
            keys::message_channel(&route.service_name, instances.first().map(String::as_str))
        }
    };

    let payload = serde_json::to_string(message)?;
    let receivers = registry.publish(&channel, &payload).await?;
    tracing::debug!(%channel, receivers, "message published");
    Ok(channel)
}

/// Pick the node that should serve a request for `route`.
pub async fn resolve_target<S: RegistryStore>(
    registry: &Registry<S>,
    route: &Route,
) -> Result<ServiceNode> {
    if let Some(instance) = &route.instance {
        return registry
            .get_node(instance)
            .await?
            .ok_or_else(|| RegistryError::ServiceUnavailable(format!("{instance}@{}", route.service_name)));
    }

    for instance in registry.find_service_instances(&route.service_name).await {
        if let Some(node) = registry.get_node(&instance).await? {
            return Ok(node);
        }
    }

    registry
        .get_all_nodes()
        .await?
        .into_iter()
        .map(|(_, node)| node)
        .find(|node| node.service_name() == route.service_name)
        .ok_or_else(|| RegistryError::ServiceUnavailable(route.service_name.clone()))
}

/// HTTP URL for `path` on a node, if the node publishes an address.
pub fn api_url(node: &ServiceNode, path: &str) -> Option<String> {
    let ip = node.service_ip()?;
    let port = node.service_port()?;
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!("http://{ip}:{port}{separator}{path}"))
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

/// Forward an envelope as an HTTP request to an instance of its service.
///
/// A 2xx response is returned as its body (JSON, or a JSON string when the
/// body is not JSON). Other statuses are wrapped as
/// `{statusCode, statusMessage, result}`.
pub async fn make_api_request<S: RegistryStore>(
    registry: &Registry<S>,
    envelope: &Envelope,
    route: &Route,
) -> Result<Value> {
    let node = resolve_target(registry, route).await?;
    let url = api_url(&node, &route.path).ok_or_else(|| {
        RegistryError::ServiceUnavailable(format!("{} (node has no address)", route.service_name))
    })?;
    tracing::debug!(%url, method = %route.method, mid = %envelope.mid, "forwarding API request");

    // Service addresses are internal to the mesh.
    let client = reqwest::Client::builder().no_proxy().build()?;
    let mut request = client
        .request(http_method(route.method), &url)
        .header("x-umf-mid", envelope.mid.as_str())
        .header("x-umf-from", envelope.from.as_str());
    if route.method.accepts_payload() {
        request = request.json(&envelope.body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let result = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if status.is_success() {
        Ok(result)
    } else {
        Ok(json!({
            "statusCode": status.as_u16(),
            "statusMessage": status.canonical_reason().unwrap_or_default(),
            "result": result,
        }))
    }
}
