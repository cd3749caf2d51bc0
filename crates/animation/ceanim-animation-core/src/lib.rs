//! ceanim Animation Core
//!
//! Keyframe animation for string-property hosts. Definitions ([`Animation`])
//! hold affectors, each writing one named property from a sorted keyframe
//! timeline through an [`Interpolator`]. Instances play a definition against a
//! target implementing [`PropertySet`]. The [`AnimationManager`] owns
//! definitions, instances and the interpolator registry, and loads and writes
//! the XML definition format.

pub mod affector;
pub mod animation;
pub mod config;
pub mod error;
pub mod ids;
pub mod instance;
pub mod interp;
pub mod keyframe;
pub mod manager;
pub mod outputs;
pub mod xml;

// Re-exports for hosts
pub use affector::{Affector, ApplicationMethod, Bracket};
pub use animation::{Animation, AnimationAction, ReplayMode};
pub use config::Config;
pub use error::AnimationError;
pub use ids::InstId;
pub use instance::{AnimationInstance, Playback};
pub use interp::{
    DiscreteInterpolator, DiscreteRelativeInterpolator, Interpolator, InterpolatorRegistry,
    LinearInterpolator, QuaternionSlerpInterpolator,
};
pub use keyframe::{KeyFrame, Progression};
pub use manager::AnimationManager;
pub use outputs::{AnimationEvent, AnimationEventKind};
pub use xml::{write_animation_xml, write_animations_xml};
pub use ceanim_api_core::{PropertyError, PropertyMap, PropertySet, SharedPropertySet};

pub type Result<T, E = AnimationError> = std::result::Result<T, E>;
