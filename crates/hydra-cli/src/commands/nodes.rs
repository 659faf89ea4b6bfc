//! `hydra-cli nodes [list] [filter]` and `hydra-cli nodes remove <id>`.

use std::io::Write;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use hydra_core::output::render_json;
use hydra_core::ServiceNode;
use hydra_registry::{Registry, RegistryStore};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NodesArgs {
    /// Without an action, list every node.
    #[command(subcommand)]
    pub action: Option<NodesAction>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum NodesAction {
    /// Display nodes, optionally filtered by service name.
    #[command(override_usage = "hydra-cli nodes list [serviceName]")]
    List {
        #[arg(value_name = "serviceName")]
        filter: Option<String>,
    },
    /// Remove a node from the registry.
    #[command(override_usage = "hydra-cli nodes remove <instanceId>")]
    Remove {
        #[arg(value_name = "instanceId")]
        id: String,
    },
}

/// Print every node whose service name contains `filter`, each annotated
/// with the seconds elapsed since it last updated.
pub async fn list<S, W>(
    registry: &Registry<S>,
    filter: Option<&str>,
    now: DateTime<Utc>,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: RegistryStore,
    W: Write,
{
    let filter = filter.unwrap_or_default();
    let nodes: Vec<ServiceNode> = registry
        .get_all_nodes()
        .await?
        .into_iter()
        .map(|(_, node)| node)
        .filter(|node| node.matches(filter))
        .map(|node| node.with_elapsed(now))
        .collect();
    writeln!(out, "{}", render_json(&nodes))?;
    Ok(())
}

/// Remove one node by instance id.
pub async fn remove<S, W>(registry: &Registry<S>, id: &str, out: &mut W) -> anyhow::Result<()>
where
    S: RegistryStore,
    W: Write,
{
    if registry.delete_node(id).await? {
        writeln!(out, "Removed node {id}")?;
    } else {
        writeln!(out, "Node {id} not found")?;
    }
    Ok(())
}
