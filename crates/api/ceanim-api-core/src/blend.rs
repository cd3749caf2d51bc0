//! Blending traits used by the interpolators.
//!
//! - [`Accumulate`]: the `add` operation (numeric sum, string concatenation)
//! - [`Interpolate`]: `difference` + `scale`, giving linear interpolation
//!
//! `lerp(a, b, t)` is `a·(1-t) + b·t`, evaluated as `a + (b - a)·t` so equal
//! endpoints give back exactly the endpoint.

/// Combine two values of the same kind (`base + delta`).
pub trait Accumulate: Clone {
    fn accumulate(&self, other: &Self) -> Self;
}

/// Values that live in a linear space.
pub trait Interpolate: Accumulate {
    /// `self - other`
    fn difference(&self, other: &Self) -> Self;

    /// `self * factor`
    fn scale(&self, factor: f32) -> Self;

    /// Linearly interpolate between `self` and `other` by `t` (0.0 to 1.0).
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self.accumulate(&other.difference(self).scale(t))
    }
}

/// Linear interpolation for f32
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Accumulate for String {
    fn accumulate(&self, other: &Self) -> Self {
        let mut out = String::with_capacity(self.len() + other.len());
        out.push_str(self);
        out.push_str(other);
        out
    }
}

impl Accumulate for f32 {
    fn accumulate(&self, other: &Self) -> Self {
        self + other
    }
}

impl Interpolate for f32 {
    fn difference(&self, other: &Self) -> Self {
        self - other
    }

    fn scale(&self, factor: f32) -> Self {
        self * factor
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        lerp_f32(*self, *other, t)
    }
}

// Integers blend in f64 and truncate toward zero, saturating at the bounds.

impl Accumulate for i32 {
    fn accumulate(&self, other: &Self) -> Self {
        self.saturating_add(*other)
    }
}

impl Interpolate for i32 {
    fn difference(&self, other: &Self) -> Self {
        self.saturating_sub(*other)
    }

    fn scale(&self, factor: f32) -> Self {
        (f64::from(*self) * f64::from(factor)) as i32
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        let a = f64::from(*self);
        let b = f64::from(*other);
        (a + (b - a) * f64::from(t)) as i32
    }
}

impl Accumulate for u32 {
    fn accumulate(&self, other: &Self) -> Self {
        self.saturating_add(*other)
    }
}

impl Interpolate for u32 {
    fn difference(&self, other: &Self) -> Self {
        self.saturating_sub(*other)
    }

    fn scale(&self, factor: f32) -> Self {
        (f64::from(*self) * f64::from(factor)) as u32
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        let a = f64::from(*self);
        let b = f64::from(*other);
        (a + (b - a) * f64::from(t)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_lerp_is_exact_for_equal_endpoints() {
        for t in [0.0, 0.1, 0.3333, 0.5, 0.9, 1.0] {
            assert_eq!(Interpolate::lerp(&0.1f32, &0.1, t), 0.1);
            assert_eq!(lerp_f32(-7.25, -7.25, t), -7.25);
        }
    }

    #[test]
    fn integer_lerp_truncates() {
        assert_eq!(0i32.lerp(&10, 0.25), 2);
        assert_eq!(0i32.lerp(&-10, 0.25), -2);
        assert_eq!(10u32.lerp(&0, 0.95), 0);
        assert_eq!(i32::MIN.lerp(&i32::MAX, 1.0), i32::MAX);
        assert_eq!(7i32.lerp(&7, 0.3), 7);
    }

    #[test]
    fn strings_concatenate() {
        assert_eq!("ab".to_string().accumulate(&"cd".to_string()), "abcd");
    }

    #[test]
    fn unsigned_scale_and_difference_saturate() {
        assert_eq!(3u32.difference(&5), 0);
        assert_eq!(4u32.scale(-1.0), 0);
        assert_eq!(u32::MAX.accumulate(&1), u32::MAX);
    }
}
