//! `hydra-cli message create` and `hydra-cli message send <messageFile>`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use hydra_core::message::load_message_file;
use hydra_core::output::render_json;
use hydra_core::Envelope;
use hydra_registry::{send_message, Registry, RegistryStore};
use serde_json::{Map, Value};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub action: MessageAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MessageAction {
    /// Print a message template.
    #[command(override_usage = "hydra-cli message create")]
    Create,
    /// Send the message held in a file.
    #[command(override_usage = "hydra-cli message send <messageFile>")]
    Send {
        #[arg(value_name = "messageFile")]
        file: PathBuf,
    },
}

impl MessageAction {
    pub fn needs_store(&self) -> bool {
        matches!(self, MessageAction::Send { .. })
    }
}

/// Print a message template to fill in and pass to `message send`.
pub fn create<W: Write>(out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "{}", render_json(&Envelope::template().to_object()))?;
    Ok(())
}

/// Load the outgoing message. The file holds the complete message object.
pub fn load(path: &Path) -> anyhow::Result<Map<String, Value>> {
    Ok(load_message_file(path)?)
}

/// Publish a loaded message to the service named in its `to` route.
pub async fn send<S, W>(registry: &Registry<S>, message: &Map<String, Value>, out: &mut W) -> anyhow::Result<()>
where
    S: RegistryStore,
    W: Write,
{
    let channel = send_message(registry, message).await?;
    writeln!(out, "Message sent to {channel}")?;
    Ok(())
}
