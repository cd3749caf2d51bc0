//! Error types for the animation core.

use ceanim_api_core::{FormatError, PropertyError};
use thiserror::Error;

/// Errors raised by animation definitions, instances and the manager.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// Duplicate name, type, keyframe position or auto-subscription.
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: &'static str, name: String },

    /// Lookup miss.
    #[error("{kind} not found: {name}")]
    UnknownObject { kind: &'static str, name: String },

    /// Out-of-range index, bad argument or a request that cannot be honoured.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A property string could not be converted.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The target rejected a property read or write.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// The XML document itself is malformed.
    #[error("malformed animation XML: {reason}")]
    Xml { reason: String },

    /// A definition failed to load; `context` names the offending element.
    #[error("{context}: {source}")]
    Load {
        context: String,
        #[source]
        source: Box<AnimationError>,
    },

    #[error("IO error: {reason}")]
    Io { reason: String },
}

impl AnimationError {
    pub(crate) fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownObject {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub(crate) fn in_context(self, context: impl Into<String>) -> Self {
        Self::Load {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through loader context.
    pub fn root_cause(&self) -> &AnimationError {
        match self {
            Self::Load { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Errors that only affect a single tick and leave the registry consistent.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Format(_) | Self::Property(_) | Self::Io { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self.root_cause() {
            Self::AlreadyExists { .. } | Self::UnknownObject { .. } => "registry",
            Self::InvalidRequest { .. } => "request",
            Self::Format(_) | Self::Property(_) => "property",
            Self::Xml { .. } | Self::Load { .. } => "definition",
            Self::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for AnimationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<roxmltree::Error> for AnimationError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml {
            reason: err.to_string(),
        }
    }
}
