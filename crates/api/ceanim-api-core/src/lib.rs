//! ceanim-api-core: property values and the string property boundary.
//!
//! Animations drive named string properties on host objects. This crate owns
//! the closed set of value kinds those strings encode, their codecs, the
//! arithmetic the interpolators blend with, and the [`PropertySet`] surface.

pub mod blend;
pub mod codec;
pub mod colour;
pub mod error;
pub mod geometry;
pub mod property;
pub mod quaternion;
pub mod udim;

pub use blend::{lerp_f32, Accumulate, Interpolate};
pub use codec::PropertyValue;
pub use colour::{Colour, ColourRect};
pub use error::{FormatError, PropertyError};
pub use geometry::{Rectf, Sizef, Vector2f, Vector3f};
pub use property::{PropertyMap, PropertySet, SharedPropertySet};
pub use quaternion::Quaternion;
pub use udim::{UBox, UDim, URect, USize, UVector2};
