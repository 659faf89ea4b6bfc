//! Command handlers, one module per verb.

pub mod config;
pub mod healthlog;
pub mod message;
pub mod nodes;
pub mod rest;
pub mod routes;
