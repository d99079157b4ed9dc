//! Connection management for sqlchat.
//!
//! Centralizes the connection lifecycle: open, replace, close.

pub mod manager;

pub use manager::{ActiveConnection, ConnectionManager};
