//! Hydra CLI — command-line client for the Hydra service registry.
//!
//! Commands: config, config list, message create, message send, nodes,
//! nodes remove, rest, routes, healthlog.

pub mod app;
pub mod commands;
pub mod dispatch;

pub use app::{run_invocation, shutdown, Connector, Context, RedisConnector};
pub use dispatch::{parse_args, parse_command, Cli, Command, UsageError};
