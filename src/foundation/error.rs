use crate::scene::model::ElementId;

/// Convenience result type used across Placard.
pub type PlacardResult<T> = Result<T, PlacardError>;

/// Top-level error taxonomy used by editor APIs.
///
/// Operations that reference an element id which no longer exists are not errors: they are
/// silent no-ops, because they arise from benign races between UI events.
#[derive(thiserror::Error, Debug)]
pub enum PlacardError {
    /// An uploaded or referenced overlay image could not be decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// The base image could not be loaded during export.
    #[error("base image load error: {0}")]
    BaseImageLoad(String),

    /// An overlay image could not be loaded during export.
    #[error("overlay image load error (element {id}): {reason}")]
    OverlayImageLoad {
        /// Element whose source failed to load.
        id: ElementId,
        /// Underlying failure.
        reason: String,
    },

    /// Invalid user-provided data (patches, documents, config).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised while rasterizing a composition.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlacardError {
    /// Build a [`PlacardError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`PlacardError::BaseImageLoad`] value.
    pub fn base_image_load(msg: impl Into<String>) -> Self {
        Self::BaseImageLoad(msg.into())
    }

    /// Build a [`PlacardError::OverlayImageLoad`] value.
    pub fn overlay_image_load(id: ElementId, reason: impl Into<String>) -> Self {
        Self::OverlayImageLoad {
            id,
            reason: reason.into(),
        }
    }

    /// Build a [`PlacardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlacardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PlacardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
