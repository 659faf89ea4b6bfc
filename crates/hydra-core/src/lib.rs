//! Hydra Core — config store, registry key layout, UMF message builder,
//! route parser and JSON output rendering for the Hydra command-line client.

pub mod config;
pub mod error;
pub mod keys;
pub mod message;
pub mod node;
pub mod output;
pub mod route;

pub use config::{ConfigStore, StoreSettings};
pub use error::CoreError;
pub use message::Envelope;
pub use node::ServiceNode;
pub use route::{parse_route, Method, Route, RouteError};
