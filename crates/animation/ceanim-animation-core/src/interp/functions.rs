//! Interpolator strategies:
//! - LinearInterpolator (lerp over `Interpolate` types)
//! - DiscreteInterpolator (switch at 0.5, no combination with the base)
//! - DiscreteRelativeInterpolator (switch at 0.5, relative mode adds to the base)
//! - QuaternionSlerpInterpolator (spherical blend of rotations)

use std::fmt;
use std::marker::PhantomData;

use ceanim_api_core::{Accumulate, FormatError, Interpolate, PropertyValue, Quaternion};

use super::Interpolator;

/// Scale factor for relative-multiply: both keyframe values are read as floats.
#[inline]
fn multiply_factor(value1: &str, value2: &str, position: f32) -> Result<f32, FormatError> {
    let v1 = f32::from_property_str(value1)?;
    let v2 = f32::from_property_str(value2)?;
    Ok(Interpolate::lerp(&v1, &v2, position))
}

/// Discrete choice: left value until the midpoint, right value from 0.5 on.
#[inline]
fn pick<'a, T>(v1: &'a T, v2: &'a T, position: f32) -> &'a T {
    if position < 0.5 {
        v1
    } else {
        v2
    }
}

/// Linear blend for any `PropertyValue + Interpolate` type.
pub struct LinearInterpolator<T> {
    type_name: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> LinearInterpolator<T> {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for LinearInterpolator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LinearInterpolator")
            .field(&self.type_name)
            .finish()
    }
}

impl<T: PropertyValue + Interpolate> Interpolator for LinearInterpolator<T> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn interpolate_absolute(
        &self,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let v1 = T::from_property_str(value1)?;
        let v2 = T::from_property_str(value2)?;
        Ok(v1.lerp(&v2, position).to_property_string())
    }

    fn interpolate_relative(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let base = T::from_property_str(base)?;
        let v1 = T::from_property_str(value1)?;
        let v2 = T::from_property_str(value2)?;
        Ok(base.accumulate(&v1.lerp(&v2, position)).to_property_string())
    }

    fn interpolate_relative_multiply(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let base = T::from_property_str(base)?;
        let factor = multiply_factor(value1, value2, position)?;
        Ok(base.scale(factor).to_property_string())
    }
}

/// Switches between the two values; the base is ignored.
pub struct DiscreteInterpolator<T> {
    type_name: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> DiscreteInterpolator<T> {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DiscreteInterpolator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiscreteInterpolator")
            .field(&self.type_name)
            .finish()
    }
}

impl<T: PropertyValue> Interpolator for DiscreteInterpolator<T> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn interpolate_absolute(
        &self,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let v1 = T::from_property_str(value1)?;
        let v2 = T::from_property_str(value2)?;
        Ok(pick(&v1, &v2, position).to_property_string())
    }

    fn interpolate_relative(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        // validated even though the chosen value replaces it
        T::from_property_str(base)?;
        self.interpolate_absolute(value1, value2, position)
    }

    /// No multiplication is defined for discrete kinds; the base is returned as is.
    fn interpolate_relative_multiply(
        &self,
        base: &str,
        _value1: &str,
        _value2: &str,
        _position: f32,
    ) -> Result<String, FormatError> {
        Ok(T::from_property_str(base)?.to_property_string())
    }
}

/// Like [`DiscreteInterpolator`], but relative mode adds the chosen value to the base.
pub struct DiscreteRelativeInterpolator<T> {
    inner: DiscreteInterpolator<T>,
}

impl<T> DiscreteRelativeInterpolator<T> {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            inner: DiscreteInterpolator::new(type_name),
        }
    }
}

impl<T> fmt::Debug for DiscreteRelativeInterpolator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiscreteRelativeInterpolator")
            .field(&self.inner.type_name)
            .finish()
    }
}

impl<T: PropertyValue + Accumulate> Interpolator for DiscreteRelativeInterpolator<T> {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn interpolate_absolute(
        &self,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        self.inner.interpolate_absolute(value1, value2, position)
    }

    fn interpolate_relative(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let base = T::from_property_str(base)?;
        let v1 = T::from_property_str(value1)?;
        let v2 = T::from_property_str(value2)?;
        Ok(base
            .accumulate(pick(&v1, &v2, position))
            .to_property_string())
    }

    fn interpolate_relative_multiply(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        self.inner
            .interpolate_relative_multiply(base, value1, value2, position)
    }
}

/// Spherical interpolation of rotations, registered as `"QuaternionSlerp"`.
#[derive(Debug, Default)]
pub struct QuaternionSlerpInterpolator;

impl QuaternionSlerpInterpolator {
    pub const TYPE_NAME: &'static str = "QuaternionSlerp";

    pub fn new() -> Self {
        Self
    }
}

impl Interpolator for QuaternionSlerpInterpolator {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn interpolate_absolute(
        &self,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let v1 = Quaternion::from_property_str(value1)?;
        let v2 = Quaternion::from_property_str(value2)?;
        Ok(v1.slerp(&v2, position, true).to_property_string())
    }

    /// Applies the blended rotation on top of the base rotation.
    fn interpolate_relative(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let base = Quaternion::from_property_str(base)?;
        let v1 = Quaternion::from_property_str(value1)?;
        let v2 = Quaternion::from_property_str(value2)?;
        Ok(base
            .mul(&v1.slerp(&v2, position, true))
            .to_property_string())
    }

    /// Scales the base rotation's angle by the blended factor.
    fn interpolate_relative_multiply(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError> {
        let base = Quaternion::from_property_str(base)?;
        let factor = multiply_factor(value1, value2, position)?;
        Ok(Quaternion::IDENTITY
            .slerp(&base, factor, true)
            .to_property_string())
    }
}
