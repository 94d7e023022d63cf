/// Convenience result type used across wheelspin.
pub type SpinResult<T> = Result<T, SpinError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Encoding exhaustion and precision deviation do not abort a request; they are reported through
/// [`crate::Diagnostic`].
#[derive(thiserror::Error, Debug)]
pub enum SpinError {
    /// Invalid outcome, layout or numeric parameter. Raised before any state is created.
    #[error("validation error: {0}")]
    Validation(String),

    /// A static asset or a frame failed to draw.
    #[error("generation error: {0}")]
    Generation(String),

    /// A single encoding attempt failed inside the codec.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The caller abandoned an in-flight job.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Errors when serializing or deserializing configuration and reports.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpinError {
    /// Build a [`SpinError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SpinError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`SpinError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`SpinError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Build a [`SpinError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for input validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
