/// Convenience result type used across reframe.
pub type ReframeResult<T> = Result<T, ReframeError>;

/// Top-level error taxonomy used by internal engine helpers.
///
/// Public passes do not surface these directly; they fold them into the
/// `errors` list of their outcome records.
#[derive(thiserror::Error, Debug)]
pub enum ReframeError {
    /// Invalid user-provided document, configuration or advice data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A node handle did not resolve in the document.
    #[error("missing node: {0}")]
    MissingNode(String),

    /// A tree mutation (insert, reparent, resize) could not be applied.
    #[error("mutation error: {0}")]
    Mutation(String),

    /// The host could not load a font required for ranged text edits.
    #[error("font load error: {family} {style}: {reason}")]
    FontLoad {
        /// Font family name.
        family: String,
        /// Font style name.
        style: String,
        /// Loader-provided reason.
        reason: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReframeError {
    /// Build a [`ReframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReframeError::MissingNode`] value.
    pub fn missing_node(what: impl Into<String>) -> Self {
        Self::MissingNode(what.into())
    }

    /// Build a [`ReframeError::Mutation`] value.
    pub fn mutation(msg: impl Into<String>) -> Self {
        Self::Mutation(msg.into())
    }

    /// Build a [`ReframeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
