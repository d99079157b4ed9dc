//! End-to-end tests of the sqlchat binary.

pub mod headless_test;
