//! `hydra-cli config` and `hydra-cli config list`.

use std::io::Write;

use clap::{Args, Subcommand};
use hydra_core::config::PROMPTED_KEYS;
use hydra_core::output::render_json;
use hydra_core::ConfigStore;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Without an action, prompt for the connection values.
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Display the current configuration.
    #[command(override_usage = "hydra-cli config list")]
    List,
}

/// Prompt for the store connection values and persist them.
///
/// Answers are stored as entered. A blank answer keeps the current value;
/// every other field of the config object is left untouched.
pub async fn configure<R, W>(config: &mut ConfigStore, input: &mut R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    for key in PROMPTED_KEYS {
        let current = config.get(key).map(display_value);
        match &current {
            Some(value) => write!(out, "{key} [{value}]: ")?,
            None => write!(out, "{key}: ")?,
        }
        out.flush()?;

        let mut line = String::new();
        input.read_line(&mut line).await?;
        let answer = line.trim_end_matches(['\r', '\n']);

        if !answer.is_empty() {
            config.set(key, Value::String(answer.to_string()));
        } else if current.is_none() {
            config.set(key, Value::String(String::new()));
        }
    }

    config.save()?;
    tracing::info!(path = %config.path().display(), "config saved");
    writeln!(out)?;
    writeln!(out, "Configuration saved to {}", config.path().display())?;
    Ok(())
}

/// Print the loaded config object.
pub fn list<W: Write>(config: &ConfigStore, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "{}", render_json(config.values()))?;
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
