//! Typed errors raised by synthesis and replay.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("fragment subset is disconnected ({components} components)")]
    Disconnected { components: usize },
    #[error("fragment {index} has no events")]
    EmptyFragment { index: usize },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("model is empty")]
    EmptyModel,
    #[error("model has no transition labeled '{0}'")]
    UnknownLabel(String),
    #[error("label '{0}' maps to more than one transition")]
    AmbiguousLabel(String),
}
