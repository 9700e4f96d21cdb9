//! Infrastructure adapters for IO, config, and external integrations.

pub mod clipboard;
pub mod config;
pub mod log;
pub mod watch;
