//! Application layer orchestrating domain logic and infrastructure.

pub mod coordinator;
pub mod debounce;
pub mod export;
pub mod selection;
pub mod session;
pub mod suggest;
pub mod view;
