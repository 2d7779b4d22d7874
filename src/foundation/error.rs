/// Convenience result type used across mixdeck.
pub type MixdeckResult<T> = Result<T, MixdeckError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Editing operations on stale layer ids never produce errors; they report "nothing happened"
/// through `bool`/`Option` returns instead.
#[derive(thiserror::Error, Debug)]
pub enum MixdeckError {
    /// Invalid caller-provided data (geometry, opacity, canvas size).
    #[error("validation error: {0}")]
    Validation(String),

    /// Closed-set violations and invalid options.
    #[error("config error: {0}")]
    Config(String),

    /// Failures inside a paint target.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MixdeckError {
    /// Build a [`MixdeckError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MixdeckError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MixdeckError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MixdeckError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
