//! Hydra Registry — client for the Hydra service registry's key-value store.
//!
//! Provides the [`RegistryStore`] seam with a Redis implementation, the
//! [`Registry`] query façade, and the outbound message/API transport. The
//! `testing` feature adds an in-memory store.

pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod redis_store;
pub mod registry;
pub mod store;
pub mod transport;

pub use error::RegistryError;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use registry::Registry;
pub use store::RegistryStore;
pub use transport::{make_api_request, send_message};
