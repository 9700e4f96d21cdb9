//! Turning event logs into ranked partial-order fragments.

pub mod oracle;
pub mod producer;
