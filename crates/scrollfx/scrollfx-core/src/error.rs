//! Error types for scrollfx.

use crate::ids::{ParallaxId, TargetId};

/// Errors surfaced by binding and driving widget instances.
///
/// Media problems are never reported here: a missing or stalled video
/// degrades to the image path instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FxError {
    /// An option value is outside its accepted range.
    #[error("Invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    /// The finish value could not be turned into a count target.
    #[error("Cannot parse count finish value from {text:?}")]
    InvalidFinish { text: String },

    /// No animation is bound under this id.
    #[error("Animation target not found: {0:?}")]
    TargetNotFound(TargetId),

    /// No parallax background is bound under this id.
    #[error("Parallax target not found: {0:?}")]
    ParallaxNotFound(ParallaxId),

    /// A trigger tried to fire a second time.
    #[error("Trigger already fired")]
    AlreadyFired,

    /// Declarative attributes could not be turned into options.
    #[error("Attribute error: {reason}")]
    Attribute { reason: String },
}

impl FxError {
    pub(crate) fn invalid(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Attribute {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FxError>;
