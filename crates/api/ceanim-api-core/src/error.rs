//! Error types for the property-value boundary.

use thiserror::Error;

/// A property string could not be converted to (or from) a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert '{input}' to {type_name}")]
pub struct FormatError {
    pub type_name: &'static str,
    pub input: String,
}

impl FormatError {
    pub fn new(type_name: &'static str, input: impl Into<String>) -> Self {
        Self {
            type_name,
            input: input.into(),
        }
    }
}

/// Failures reported by a [`crate::PropertySet`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The target has no property with this name.
    #[error("unknown property '{0}'")]
    Unknown(String),

    /// The target refused the write.
    #[error("property '{name}' rejected value '{value}': {reason}")]
    Rejected {
        name: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}
