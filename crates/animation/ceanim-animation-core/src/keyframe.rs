//! Keyframes: a (position, value, progression) anchor on an affector's timeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::instance::AnimationInstance;

/// How the fraction between a keyframe and its left neighbour is reshaped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Progression {
    #[default]
    Linear,
    Discrete,
    QuadraticAccelerating,
    QuadraticDecelerating,
}

impl Progression {
    /// Name used by the XML format.
    pub fn as_str(self) -> &'static str {
        match self {
            Progression::Linear => "linear",
            Progression::Discrete => "discrete",
            Progression::QuadraticAccelerating => "quadratic accelerating",
            Progression::QuadraticDecelerating => "quadratic decelerating",
        }
    }

    /// Reshape a raw fraction in `[0, 1]`.
    #[inline]
    pub fn alter_interpolation_position(self, f: f32) -> f32 {
        match self {
            Progression::Linear => f,
            Progression::Discrete => {
                if f < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Progression::QuadraticAccelerating => f * f,
            Progression::QuadraticDecelerating => {
                let inv = 1.0 - f;
                1.0 - inv * inv
            }
        }
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Progression {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Progression::Linear),
            "discrete" => Ok(Progression::Discrete),
            "quadratic accelerating" => Ok(Progression::QuadraticAccelerating),
            "quadratic decelerating" => Ok(Progression::QuadraticDecelerating),
            other => Err(AnimationError::invalid(format!(
                "unknown progression '{other}'"
            ))),
        }
    }
}

/// A value anchor owned by an [`Affector`](crate::Affector).
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFrame {
    position: f32,
    value: String,
    progression: Progression,
    source_property: Option<String>,
}

impl KeyFrame {
    pub(crate) fn new(
        position: f32,
        value: String,
        progression: Progression,
        source_property: Option<String>,
    ) -> Self {
        Self {
            position,
            value,
            progression,
            source_property: source_property.filter(|s| !s.is_empty()),
        }
    }

    /// Position on the owning affector's timeline. Changed only through
    /// [`Affector::move_key_frame_to_position`](crate::Affector::move_key_frame_to_position).
    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: f32) {
        self.position = position;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn progression(&self) -> Progression {
        self.progression
    }

    pub fn set_progression(&mut self, progression: Progression) {
        self.progression = progression;
    }

    pub fn source_property(&self) -> Option<&str> {
        self.source_property.as_deref()
    }

    /// An empty name clears the source property.
    pub fn set_source_property(&mut self, name: Option<String>) {
        self.source_property = name.filter(|s| !s.is_empty());
    }

    #[inline]
    pub fn alter_interpolation_position(&self, f: f32) -> f32 {
        self.progression.alter_interpolation_position(f)
    }

    /// The value to interpolate from: the snapshot of the source property when
    /// one is configured, otherwise the literal value.
    pub fn value_for_animation<'a>(
        &'a self,
        instance: &'a AnimationInstance,
    ) -> Result<&'a str, AnimationError> {
        match &self.source_property {
            Some(source) => instance
                .saved_property_value(source)
                .ok_or_else(|| AnimationError::unknown("saved property value", source.clone())),
            None => Ok(&self.value),
        }
    }

    /// Snapshot the source property on the instance's target, if configured.
    pub fn save_property_value(&self, instance: &mut AnimationInstance) -> Result<(), AnimationError> {
        match &self.source_property {
            Some(source) => instance.save_property_value(source),
            None => Ok(()),
        }
    }
}

/// Normalise and validate a keyframe position.
pub(crate) fn checked_position(position: f32) -> Result<f32, AnimationError> {
    if !position.is_finite() || position < 0.0 {
        return Err(AnimationError::invalid(format!(
            "keyframe position must be finite and >= 0, got {position}"
        )));
    }
    // collapses -0.0
    Ok(position + 0.0)
}
