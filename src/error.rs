use crate::{config::ConfigError, sequencing::SequenceError};

/// Errors raised while building a renderer. Rendering itself cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}
