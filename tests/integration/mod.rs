//! Integration tests for the session pipeline and database clients.

pub mod common;
pub mod connection_test;
pub mod mysql_test;
pub mod session_test;
pub mod sqlite_test;
