//! TUI widgets for sqlchat.

pub mod chat;
pub mod header;
pub mod input;
pub mod sidebar;
