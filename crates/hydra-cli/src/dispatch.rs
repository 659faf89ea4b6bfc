//! Verb dispatch: command-line words to a [`Command`].
//!
//! Parsing is done by clap; its errors are folded into one-line
//! [`UsageError`] diagnostics so that every outcome can be printed and the
//! invocation can still end normally.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser, Subcommand};

use crate::commands::config::ConfigArgs;
use crate::commands::healthlog::HealthLogArgs;
use crate::commands::message::MessageArgs;
use crate::commands::nodes::NodesArgs;
use crate::commands::rest::RestArgs;
use crate::commands::routes::RoutesArgs;

/// Help text printed for `help` or when no verb is given.
pub const HELP: &str = "\
hydra-cli - command line client for the Hydra service registry

Usage: hydra-cli [--config <path>] [--log-level <level>] <command> [arguments]

Commands:
  help                          show this help
  config                        configure the registry store connection
  config list                   display the current configuration
  healthlog <serviceName>       display the health log of a service
  message create                print a message template
  message send <messageFile>    send the message in messageFile
  nodes [list] [serviceName]    display nodes, optionally filtered by name
  nodes remove <instanceId>     remove a node from the registry
  rest <route> [payloadFile]    make an API request to a service route
  routes [serviceName]          display service routes, optionally filtered

Routes take the form [instance@]serviceName:[method]/path or
[method]serviceName:/path, e.g.
  hydra-cli rest users:[post]/v1/users user.json
";

/// Hydra CLI — inspect and talk to services registered with Hydra.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "hydra-cli",
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Path to the config file (defaults to ~/.hydra-cli).
    #[arg(long, env = "HYDRA_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level for diagnostics on stderr (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the list of commands.
    Help,
    /// Configure the registry store connection, or list the configuration.
    Config(ConfigArgs),
    /// Print a message template or send a message file.
    Message(MessageArgs),
    /// List or remove service nodes.
    Nodes(NodesArgs),
    /// Make an API request to a service route.
    #[command(override_usage = "hydra-cli rest <route> [payloadFile]")]
    Rest(RestArgs),
    /// Display the routes registered by each service.
    #[command(override_usage = "hydra-cli routes [serviceName]")]
    Routes(RoutesArgs),
    /// Display the health log of a service.
    #[command(name = "healthlog", override_usage = "hydra-cli healthlog <serviceName>")]
    HealthLog(HealthLogArgs),
}

impl Command {
    /// Whether the command needs a store connection.
    pub fn needs_store(&self) -> bool {
        match self {
            Command::Help | Command::Config(_) => false,
            Command::Message(args) => args.action.needs_store(),
            Command::Nodes(_) | Command::Rest(_) | Command::Routes(_) | Command::HealthLog(_) => true,
        }
    }
}

/// Invalid invocation. The display text is the one-line diagnostic printed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown {verb} command: {sub}")]
    UnknownSubcommand { verb: String, sub: String },

    #[error("{verb} requires a subcommand: {expected}")]
    MissingSubcommand { verb: String, expected: String },

    /// Wrong number of arguments; holds the usage line of the command.
    #[error("{0}")]
    Arity(String),

    /// `--version` was given; holds the version line.
    #[error("{0}")]
    Version(String),

    #[error("{0}")]
    Invalid(String),
}

impl UsageError {
    /// Fold a clap parse error into a one-line diagnostic.
    ///
    /// `words` are the arguments that were parsed, without the program name.
    pub fn from_clap(err: &clap::Error, words: &[String]) -> Self {
        let token = |kind| match err.get(kind) {
            Some(ContextValue::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        };

        match err.kind() {
            ErrorKind::DisplayVersion => UsageError::Version(err.render().to_string().trim_end().to_string()),
            ErrorKind::InvalidSubcommand => {
                let sub = token(ContextKind::InvalidSubcommand).unwrap_or_default();
                let reached = Reached::walk(words, Some(&sub));
                match reached.verb() {
                    Some(verb) => UsageError::UnknownSubcommand { verb, sub },
                    None => UsageError::UnknownCommand(sub),
                }
            }
            ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let reached = Reached::walk(words, None);
                let expected = reached
                    .command
                    .get_subcommands()
                    .map(|sub| sub.get_name())
                    .collect::<Vec<_>>()
                    .join(" | ");
                UsageError::MissingSubcommand {
                    verb: reached.verb().unwrap_or_else(|| "hydra-cli".to_string()),
                    expected,
                }
            }
            ErrorKind::UnknownArgument | ErrorKind::MissingRequiredArgument | ErrorKind::TooManyValues => {
                let arg = token(ContextKind::InvalidArg).unwrap_or_default();
                let mut reached = Reached::walk(words, None);
                if reached.verb().is_none() {
                    return UsageError::UnknownCommand(arg);
                }
                UsageError::Arity(reached.command.render_usage().to_string().trim_end().to_string())
            }
            _ => {
                let rendered = err.render().to_string();
                let line = rendered.lines().next().unwrap_or_default();
                UsageError::Invalid(line.trim_start_matches("error: ").to_string())
            }
        }
    }
}

/// The deepest command named by a word list.
struct Reached {
    command: clap::Command,
    depth: usize,
}

impl Reached {
    /// Follow subcommand names through `words`, stopping at `stop` when it
    /// is not itself a subcommand of the command reached so far.
    fn walk(words: &[String], stop: Option<&str>) -> Self {
        let mut command = Cli::command();
        let mut depth = 0;
        for word in words {
            let next = command.find_subcommand(word).cloned();
            match next {
                Some(next) => {
                    command = next;
                    depth += 1;
                }
                None if Some(word.as_str()) == stop => break,
                None => {}
            }
        }
        Self { command, depth }
    }

    /// Name of the verb reached, if any.
    fn verb(&self) -> Option<String> {
        (self.depth > 0).then(|| self.command.get_name().to_string())
    }
}

/// Parse command-line words (without the program name).
pub fn parse_args(words: &[String]) -> Result<Cli, UsageError> {
    let argv = std::iter::once(OsString::from("hydra-cli")).chain(words.iter().map(OsString::from));
    Cli::try_parse_from(argv).map_err(|e| {
        tracing::debug!(kind = ?e.kind(), "command line rejected");
        UsageError::from_clap(&e, words)
    })
}

/// Parse command-line words into the command to run. `None` means help.
pub fn parse_command(words: &[String]) -> Result<Option<Command>, UsageError> {
    parse_args(words).map(|cli| cli.command)
}
