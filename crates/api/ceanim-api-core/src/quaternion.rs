//! Rotation quaternions (w, x, y, z).
//!
//! Quaternions are not blended through [`crate::Interpolate`]; rotations use
//! [`Quaternion::slerp`] instead.

use serde::{Deserialize, Serialize};

use crate::codec::{fmt_f32, parse_labelled, PropertyValue};
use crate::error::FormatError;

/// Above this |dot| the inputs are treated as parallel and blended with nlerp.
const DOT_THRESHOLD: f32 = 0.9995;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation built from Euler angles in radians, applied around Z, then Y, then X.
    pub fn from_euler_radians(x: f32, y: f32, z: f32) -> Self {
        let (sx, cx) = (0.5 * x).sin_cos();
        let (sy, cy) = (0.5 * y).sin_cos();
        let (sz, cz) = (0.5 * z).sin_cos();
        Self {
            w: cz * cy * cx + sz * sy * sx,
            x: cz * cy * sx - sz * sy * cx,
            y: cz * sy * cx + sz * cy * sx,
            z: sz * cy * cx - cz * sy * sx,
        }
    }

    pub fn from_euler_degrees(x: f32, y: f32, z: f32) -> Self {
        Self::from_euler_radians(x.to_radians(), y.to_radians(), z.to_radians())
    }

    #[inline]
    pub fn dot(&self, o: &Self) -> f32 {
        self.w * o.w + self.x * o.x + self.y * o.y + self.z * o.z
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy; a zero quaternion normalises to identity.
    pub fn normalised(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::IDENTITY
        } else {
            let inv = len.recip();
            Self::new(self.w * inv, self.x * inv, self.y * inv, self.z * inv)
        }
    }

    fn negated(&self) -> Self {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }

    /// Hamilton product `self * o` (apply `o` first, then `self`).
    pub fn mul(&self, o: &Self) -> Self {
        Self {
            w: self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            x: self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            y: self.w * o.y + self.y * o.w + self.z * o.x - self.x * o.z,
            z: self.w * o.z + self.z * o.w + self.x * o.y - self.y * o.x,
        }
    }

    /// Spherical interpolation from `self` to `o`.
    ///
    /// With `shortest_path` the second rotation is flipped when the inputs lie
    /// in opposite hemispheres so the blend never takes the long way round.
    pub fn slerp(&self, o: &Self, t: f32, shortest_path: bool) -> Self {
        let mut cos_omega = self.dot(o);
        let mut target = *o;
        if shortest_path && cos_omega < 0.0 {
            cos_omega = -cos_omega;
            target = o.negated();
        }

        if cos_omega.abs() > DOT_THRESHOLD {
            // nearly parallel, sin(omega) would vanish
            return Self::new(
                self.w + (target.w - self.w) * t,
                self.x + (target.x - self.x) * t,
                self.y + (target.y - self.y) * t,
                self.z + (target.z - self.z) * t,
            )
            .normalised();
        }

        let omega = cos_omega.clamp(-1.0, 1.0).acos();
        let inv_sin = omega.sin().recip();
        let s0 = ((1.0 - t) * omega).sin() * inv_sin;
        let s1 = (t * omega).sin() * inv_sin;
        Self::new(
            s0 * self.w + s1 * target.w,
            s0 * self.x + s1 * target.x,
            s0 * self.y + s1 * target.y,
            s0 * self.z + s1 * target.z,
        )
    }
}

impl PropertyValue for Quaternion {
    const TYPE_NAME: &'static str = "Quaternion";

    /// Accepts `w:.. x:.. y:.. z:..` or Euler degrees as `x:.. y:.. z:..`.
    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        if s.contains("w:") {
            let [w, x, y, z] = parse_labelled(s, ["w", "x", "y", "z"], Self::TYPE_NAME)?;
            Ok(Self::new(w, x, y, z))
        } else {
            let [x, y, z] = parse_labelled(s, ["x", "y", "z"], Self::TYPE_NAME)?;
            Ok(Self::from_euler_degrees(x, y, z))
        }
    }

    fn to_property_string(&self) -> String {
        format!(
            "w:{} x:{} y:{} z:{}",
            fmt_f32(self.w),
            fmt_f32(self.x),
            fmt_f32(self.y),
            fmt_f32(self.z)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn slerp_halfway_about_z() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_euler_degrees(0.0, 0.0, 90.0);
        let mid = a.slerp(&b, 0.5, true);
        let expected = Quaternion::from_euler_degrees(0.0, 0.0, 45.0);
        approx(mid.w, expected.w, 1e-5);
        approx(mid.z, expected.z, 1e-5);
        approx(mid.length(), 1.0, 1e-5);
    }

    #[test]
    fn slerp_endpoints() {
        let a = Quaternion::from_euler_degrees(10.0, 0.0, 0.0);
        let b = Quaternion::from_euler_degrees(0.0, 80.0, 0.0);
        let start = a.slerp(&b, 0.0, true);
        let end = a.slerp(&b, 1.0, true);
        approx(start.x, a.x, 1e-5);
        approx(end.y, b.y, 1e-5);
    }

    #[test]
    fn shortest_path_flips_hemisphere() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::IDENTITY.negated();
        // same rotation; shortest path must not spin through 360 degrees
        let mid = a.slerp(&b, 0.5, true);
        approx(mid.w, 1.0, 1e-5);
    }

    #[test]
    fn text_forms() {
        let q = Quaternion::from_property_str("w:1 x:0 y:0 z:0").unwrap();
        assert_eq!(q, Quaternion::IDENTITY);
        assert_eq!(q.to_property_string(), "w:1 x:0 y:0 z:0");
        let euler = Quaternion::from_property_str("x:0 y:0 z:90").unwrap();
        approx(euler.z, (0.5f32).sqrt(), 1e-5);
        assert!(Quaternion::from_property_str("w:1 x:0").is_err());
    }

    #[test]
    fn product_with_identity() {
        let q = Quaternion::from_euler_degrees(30.0, 20.0, 10.0);
        assert_eq!(Quaternion::IDENTITY.mul(&q), q);
    }
}
