use glam::UVec2;
use thiserror::Error;

use crate::Binding;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenoiserError {
    /// Required texture hasn't been provided
    #[error("missing binding: {0}")]
    MissingBinding(Binding),

    /// Texture's size differs from the primary input's size
    #[error(
        "binding {binding} has size {actual:?}, but {expected:?} was expected"
    )]
    MismatchedSize {
        binding: Binding,
        expected: UVec2,
        actual: UVec2,
    },

    /// Output target is also bound as one of the inputs
    #[error("output target is aliased with binding {0}")]
    AliasedOutput(Binding),
}
