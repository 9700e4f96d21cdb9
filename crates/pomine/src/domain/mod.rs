//! Core value types: event logs, partial orders, Petri nets, fragments.

pub mod errors;
pub mod fragment;
pub mod log;
pub mod net;
pub mod order;
