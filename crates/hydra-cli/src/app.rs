//! Invocation context and command execution.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hydra_core::{ConfigStore, StoreSettings};
use hydra_registry::{RedisStore, Registry, RegistryError, RegistryStore};
use tokio::io::AsyncBufRead;

use crate::commands;
use crate::commands::config::{ConfigAction, ConfigArgs};
use crate::commands::message::{MessageAction, MessageArgs};
use crate::commands::nodes::{NodesAction, NodesArgs};
use crate::dispatch::{parse_args, parse_command, Cli, Command, HELP};

/// Delay before process exit, letting network handles close.
pub const GRACE_PERIOD: Duration = Duration::from_millis(250);

/// Opens the registry store for commands that need it.
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: RegistryStore;

    async fn connect(&self, settings: &StoreSettings) -> Result<Self::Store, RegistryError>;
}

/// Connects to the Redis server named in the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

#[async_trait]
impl Connector for RedisConnector {
    type Store = RedisStore;

    async fn connect(&self, settings: &StoreSettings) -> Result<RedisStore, RegistryError> {
        RedisStore::connect(settings).await
    }
}

/// State for one CLI invocation: the loaded config and a way to reach the
/// store.
pub struct Context<C> {
    config: ConfigStore,
    connector: C,
}

impl<C: Connector> Context<C> {
    pub fn new(config: ConfigStore, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Open a registry connection using the configured settings.
    ///
    /// An unconfigured or invalid config surfaces as a connection error.
    pub async fn connect(&self) -> Result<Registry<C::Store>, RegistryError> {
        let settings = self
            .config
            .store_settings()
            .map_err(|e| RegistryError::Connection(e.to_string()))?;
        let store = self.connector.connect(&settings).await?;
        Ok(Registry::new(store))
    }

    /// Parse and execute one invocation, printing any diagnostic to `out`.
    ///
    /// Global options among `args` are accepted but have no effect here; the
    /// binary applies them before the context is built.
    pub async fn run<R, W>(&mut self, args: &[String], input: &mut R, out: &mut W)
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        match parse_command(args) {
            Ok(command) => self.dispatch(command, input, out).await,
            Err(usage) => report(&anyhow::Error::from(usage), out),
        }
    }

    /// Execute a parsed command, or print help when there is none.
    ///
    /// Never fails: command errors are reported as a single line and the
    /// invocation ends normally.
    pub async fn dispatch<R, W>(&mut self, command: Option<Command>, input: &mut R, out: &mut W)
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let command = command.unwrap_or(Command::Help);
        if let Err(e) = self.execute(command, input, out).await {
            report(&e, out);
        }
    }

    /// Execute a parsed command.
    pub async fn execute<R, W>(&mut self, command: Command, input: &mut R, out: &mut W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        tracing::debug!(?command, needs_store = command.needs_store(), "executing");
        match command {
            Command::Help => {
                write!(out, "{HELP}")?;
                Ok(())
            }
            Command::Config(ConfigArgs { action: None }) => {
                commands::config::configure(&mut self.config, input, out).await
            }
            Command::Config(ConfigArgs {
                action: Some(ConfigAction::List),
            }) => commands::config::list(&self.config, out),
            Command::Message(MessageArgs { action }) => match action {
                MessageAction::Create => commands::message::create(out),
                MessageAction::Send { file } => {
                    let message = commands::message::load(&file)?;
                    let registry = self.connect().await?;
                    commands::message::send(&registry, &message, out).await
                }
            },
            Command::Nodes(NodesArgs { action }) => match action.unwrap_or(NodesAction::List { filter: None }) {
                NodesAction::List { filter } => {
                    let registry = self.connect().await?;
                    commands::nodes::list(&registry, filter.as_deref(), Utc::now(), out).await
                }
                NodesAction::Remove { id } => {
                    let registry = self.connect().await?;
                    commands::nodes::remove(&registry, &id, out).await
                }
            },
            Command::Rest(args) => {
                let request = commands::rest::prepare(&args)?;
                let registry = self.connect().await?;
                commands::rest::run(&registry, &request, out).await
            }
            Command::Routes(args) => {
                let registry = self.connect().await?;
                commands::routes::run(&registry, &args, out).await
            }
            Command::HealthLog(args) => {
                let registry = self.connect().await?;
                commands::healthlog::run(&registry, &args, out).await
            }
        }
    }
}

fn report<W: Write>(err: &anyhow::Error, out: &mut W) {
    tracing::debug!(error = ?err, "command failed");
    if let Err(write_err) = writeln!(out, "{err}") {
        tracing::warn!(error = %write_err, "unable to write diagnostic");
    }
}

/// Wait out the grace period before the process exits.
pub async fn shutdown() {
    tracing::debug!(grace_ms = GRACE_PERIOD.as_millis() as u64, "shutting down");
    tokio::time::sleep(GRACE_PERIOD).await;
}

/// One process invocation: parse `words`, build the context from the parsed
/// global options, execute, and wait out the grace period.
///
/// Usage errors (and `--version`) are printed as one line. Every path ends in
/// [`shutdown`], including a failed write to `out`.
pub async fn run_invocation<C, F, R, W>(words: &[String], setup: F, input: &mut R, out: &mut W) -> std::io::Result<()>
where
    C: Connector,
    F: FnOnce(&Cli) -> Context<C>,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let written = match parse_args(words) {
        Ok(cli) => {
            let mut ctx = setup(&cli);
            ctx.dispatch(cli.command, input, out).await;
            Ok(())
        }
        Err(usage) => writeln!(out, "{usage}"),
    };
    let flushed = written.and_then(|()| out.flush());
    shutdown().await;
    flushed
}
