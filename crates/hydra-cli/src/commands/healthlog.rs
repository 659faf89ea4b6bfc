//! `hydra-cli healthlog <serviceName>`.

use std::io::Write;

use clap::Args;
use hydra_core::keys::{self, HEALTH_LOG_ENTRIES};
use hydra_core::output::render_json;
use hydra_registry::{Registry, RegistryStore};
use serde_json::Value;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct HealthLogArgs {
    #[arg(value_name = "serviceName")]
    pub service: String,
}

/// Print the most recent health log entries of a service.
///
/// All matching instance logs are read in one batch, but only the first
/// instance's entries are rendered. Entries that are not JSON are shown as
/// raw strings.
pub async fn run<S, W>(registry: &Registry<S>, args: &HealthLogArgs, out: &mut W) -> anyhow::Result<()>
where
    S: RegistryStore,
    W: Write,
{
    let service = args.service.as_str();
    let log_keys = registry.find_keys(&keys::health_log_pattern(service)).await;
    if log_keys.is_empty() {
        writeln!(out, "[]")?;
        return Ok(());
    }

    let lists = registry
        .batch_list_range(&log_keys, 0, HEALTH_LOG_ENTRIES - 1)
        .await?;
    if lists.len() > 1 {
        tracing::debug!(instances = lists.len(), "showing health log of first instance only");
    }

    let entries: Vec<Value> = lists
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match serde_json::from_str(&entry) {
            Ok(value) => value,
            Err(_) => Value::String(entry),
        })
        .collect();
    writeln!(out, "{}", render_json(&entries))?;
    Ok(())
}
