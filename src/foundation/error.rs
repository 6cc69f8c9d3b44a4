/// Convenience result type used across motionboard.
pub type MotionResult<T> = Result<T, MotionError>;

/// Top-level error taxonomy.
///
/// Bad animation data never surfaces here: the sampler and resolver degrade locally instead. Only
/// invalid configuration, asset and encoder failures, and cancellation are errors.
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// Invalid user-provided configuration or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image or font asset could not be loaded or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Rasterization failed for a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The frame encoder failed or rejected its input.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The export was stopped by its caller before completion.
    #[error("export cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MotionError {
    /// Build a [`MotionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MotionError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`MotionError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MotionError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MotionError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for [`MotionError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
