//! Plain float geometry: sizes, vectors and rectangles.

use serde::{Deserialize, Serialize};

use crate::blend::{Accumulate, Interpolate};
use crate::codec::{fmt_f32, parse_labelled, PropertyValue};
use crate::error::FormatError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sizef {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Axis aligned rectangle given by its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectf {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Sizef {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Vector2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3f {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Rectf {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl PropertyValue for Sizef {
    const TYPE_NAME: &'static str = "Size";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let [width, height] = parse_labelled(s, ["w", "h"], Self::TYPE_NAME)?;
        Ok(Self { width, height })
    }

    fn to_property_string(&self) -> String {
        format!("w:{} h:{}", fmt_f32(self.width), fmt_f32(self.height))
    }
}

impl PropertyValue for Vector2f {
    const TYPE_NAME: &'static str = "Vector2";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let [x, y] = parse_labelled(s, ["x", "y"], Self::TYPE_NAME)?;
        Ok(Self { x, y })
    }

    fn to_property_string(&self) -> String {
        format!("x:{} y:{}", fmt_f32(self.x), fmt_f32(self.y))
    }
}

impl PropertyValue for Vector3f {
    const TYPE_NAME: &'static str = "Vector3";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let [x, y, z] = parse_labelled(s, ["x", "y", "z"], Self::TYPE_NAME)?;
        Ok(Self { x, y, z })
    }

    fn to_property_string(&self) -> String {
        format!(
            "x:{} y:{} z:{}",
            fmt_f32(self.x),
            fmt_f32(self.y),
            fmt_f32(self.z)
        )
    }
}

impl PropertyValue for Rectf {
    const TYPE_NAME: &'static str = "Rect";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let [left, top, right, bottom] =
            parse_labelled(s, ["l", "t", "r", "b"], Self::TYPE_NAME)?;
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    fn to_property_string(&self) -> String {
        format!(
            "l:{} t:{} r:{} b:{}",
            fmt_f32(self.left),
            fmt_f32(self.top),
            fmt_f32(self.right),
            fmt_f32(self.bottom)
        )
    }
}

impl Accumulate for Sizef {
    fn accumulate(&self, o: &Self) -> Self {
        Self::new(self.width + o.width, self.height + o.height)
    }
}

impl Interpolate for Sizef {
    fn difference(&self, o: &Self) -> Self {
        Self::new(self.width - o.width, self.height - o.height)
    }

    fn scale(&self, f: f32) -> Self {
        Self::new(self.width * f, self.height * f)
    }
}

impl Accumulate for Vector2f {
    fn accumulate(&self, o: &Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y)
    }
}

impl Interpolate for Vector2f {
    fn difference(&self, o: &Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y)
    }

    fn scale(&self, f: f32) -> Self {
        Self::new(self.x * f, self.y * f)
    }
}

impl Accumulate for Vector3f {
    fn accumulate(&self, o: &Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Interpolate for Vector3f {
    fn difference(&self, o: &Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }

    fn scale(&self, f: f32) -> Self {
        Self::new(self.x * f, self.y * f, self.z * f)
    }
}

impl Accumulate for Rectf {
    fn accumulate(&self, o: &Self) -> Self {
        Self::new(
            self.left + o.left,
            self.top + o.top,
            self.right + o.right,
            self.bottom + o.bottom,
        )
    }
}

impl Interpolate for Rectf {
    fn difference(&self, o: &Self) -> Self {
        Self::new(
            self.left - o.left,
            self.top - o.top,
            self.right - o.right,
            self.bottom - o.bottom,
        )
    }

    fn scale(&self, f: f32) -> Self {
        Self::new(self.left * f, self.top * f, self.right * f, self.bottom * f)
    }
}
