//! `hydra-cli routes [filter]`.

use std::io::Write;

use clap::Args;
use hydra_core::keys;
use hydra_core::output::render_json;
use hydra_registry::{Registry, RegistryStore};
use serde_json::{Map, Value};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RoutesArgs {
    /// Only show services whose name contains this text.
    #[arg(value_name = "serviceName")]
    pub filter: Option<String>,
}

/// Print `{serviceName: [routes...]}` for every service whose name contains
/// the filter, in the order the route keys were discovered.
pub async fn run<S, W>(registry: &Registry<S>, args: &RoutesArgs, out: &mut W) -> anyhow::Result<()>
where
    S: RegistryStore,
    W: Write,
{
    let filter = args.filter.as_deref();
    let route_keys = registry.find_keys(&keys::routes_pattern()).await;
    let services: Vec<String> = route_keys
        .iter()
        .filter_map(|key| keys::service_from_routes_key(key))
        .filter(|name| filter.map_or(true, |f| name.contains(f)))
        .map(str::to_string)
        .collect();

    let mut result = Map::new();
    for (name, routes) in registry.get_routes_for(&services).await? {
        result.insert(name, Value::from(routes));
    }
    writeln!(out, "{}", render_json(&result))?;
    Ok(())
}
