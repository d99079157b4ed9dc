//! sqlchat - chat with your relational database in natural language.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod connection;
pub mod conversation;
pub mod db;
pub mod error;
pub mod headless;
pub mod llm;
pub mod logging;
pub mod session;
pub mod tui;
