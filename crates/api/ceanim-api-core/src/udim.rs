//! Unified dimensions: a relative `scale` plus an absolute `offset`.

use serde::{Deserialize, Serialize};

use crate::blend::{Accumulate, Interpolate};
use crate::codec::{fmt_f32, parse_braced, PropertyValue};
use crate::error::FormatError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UDim {
    pub scale: f32,
    pub offset: f32,
}

impl UDim {
    pub fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    /// Resolve against a base length.
    pub fn to_absolute(&self, base: f32) -> f32 {
        base * self.scale + self.offset
    }

    fn text(&self) -> String {
        format!("{{{},{}}}", fmt_f32(self.scale), fmt_f32(self.offset))
    }

    fn from_pair(v: &[f32]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl Accumulate for UDim {
    fn accumulate(&self, o: &Self) -> Self {
        Self::new(self.scale + o.scale, self.offset + o.offset)
    }
}

impl Interpolate for UDim {
    fn difference(&self, o: &Self) -> Self {
        Self::new(self.scale - o.scale, self.offset - o.offset)
    }

    fn scale(&self, f: f32) -> Self {
        Self::new(self.scale * f, self.offset * f)
    }
}

impl PropertyValue for UDim {
    const TYPE_NAME: &'static str = "UDim";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let v: [f32; 2] = parse_braced(s, Self::TYPE_NAME)?;
        Ok(Self::from_pair(&v))
    }

    fn to_property_string(&self) -> String {
        self.text()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UVector2 {
    pub x: UDim,
    pub y: UDim,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct USize {
    pub width: UDim,
    pub height: UDim,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct URect {
    pub left: UDim,
    pub top: UDim,
    pub right: UDim,
    pub bottom: UDim,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UBox {
    pub top: UDim,
    pub left: UDim,
    pub bottom: UDim,
    pub right: UDim,
}

/// Component-wise arithmetic for the structs made of `UDim` fields.
macro_rules! udim_struct {
    ($ty:ident, $name:literal, [$($field:ident),+]) => {
        impl Accumulate for $ty {
            fn accumulate(&self, o: &Self) -> Self {
                Self { $($field: self.$field.accumulate(&o.$field)),+ }
            }
        }

        impl Interpolate for $ty {
            fn difference(&self, o: &Self) -> Self {
                Self { $($field: self.$field.difference(&o.$field)),+ }
            }

            fn scale(&self, f: f32) -> Self {
                Self { $($field: self.$field.scale(f)),+ }
            }
        }

        impl $ty {
            pub const TYPE: &'static str = $name;

            fn udims(&self) -> Vec<UDim> {
                vec![$(self.$field),+]
            }
        }
    };
}

udim_struct!(UVector2, "UVector2", [x, y]);
udim_struct!(USize, "USize", [width, height]);
udim_struct!(URect, "URect", [left, top, right, bottom]);
udim_struct!(UBox, "UBox", [top, left, bottom, right]);

fn braced_list(dims: &[UDim]) -> String {
    let inner: Vec<String> = dims.iter().map(UDim::text).collect();
    format!("{{{}}}", inner.join(","))
}

impl PropertyValue for UVector2 {
    const TYPE_NAME: &'static str = UVector2::TYPE;

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let v: [f32; 4] = parse_braced(s, Self::TYPE_NAME)?;
        Ok(Self {
            x: UDim::from_pair(&v[0..2]),
            y: UDim::from_pair(&v[2..4]),
        })
    }

    fn to_property_string(&self) -> String {
        braced_list(&self.udims())
    }
}

impl PropertyValue for USize {
    const TYPE_NAME: &'static str = USize::TYPE;

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let v: [f32; 4] = parse_braced(s, Self::TYPE_NAME)?;
        Ok(Self {
            width: UDim::from_pair(&v[0..2]),
            height: UDim::from_pair(&v[2..4]),
        })
    }

    fn to_property_string(&self) -> String {
        braced_list(&self.udims())
    }
}

impl PropertyValue for URect {
    const TYPE_NAME: &'static str = URect::TYPE;

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let v: [f32; 8] = parse_braced(s, Self::TYPE_NAME)?;
        Ok(Self {
            left: UDim::from_pair(&v[0..2]),
            top: UDim::from_pair(&v[2..4]),
            right: UDim::from_pair(&v[4..6]),
            bottom: UDim::from_pair(&v[6..8]),
        })
    }

    fn to_property_string(&self) -> String {
        braced_list(&self.udims())
    }
}

impl PropertyValue for UBox {
    const TYPE_NAME: &'static str = UBox::TYPE;

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let v: [f32; 8] = parse_braced(s, Self::TYPE_NAME)?;
        Ok(Self {
            top: UDim::from_pair(&v[0..2]),
            left: UDim::from_pair(&v[2..4]),
            bottom: UDim::from_pair(&v[4..6]),
            right: UDim::from_pair(&v[6..8]),
        })
    }

    fn to_property_string(&self) -> String {
        format!(
            "{{top:{},left:{},bottom:{},right:{}}}",
            self.top.text(),
            self.left.text(),
            self.bottom.text(),
            self.right.text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn udim_text_form() {
        let d = UDim::from_property_str("{0.5,-10}").unwrap();
        assert_eq!(d, UDim::new(0.5, -10.0));
        assert_eq!(d.to_property_string(), "{0.5,-10}");
        assert_eq!(d.to_absolute(200.0), 90.0);
    }

    #[test]
    fn uvector2_and_usize_share_layout() {
        let text = "{{0,5},{1,-5}}";
        assert_eq!(UVector2::from_property_str(text).unwrap().to_property_string(), text);
        let size = USize::from_property_str(text).unwrap();
        assert_eq!(size.height, UDim::new(1.0, -5.0));
    }

    #[test]
    fn ubox_keeps_labels() {
        let text = "{top:{0,1},left:{0,2},bottom:{0,3},right:{0,4}}";
        let b = UBox::from_property_str(text).unwrap();
        assert_eq!(b.right, UDim::new(0.0, 4.0));
        assert_eq!(b.to_property_string(), text);
    }

    #[test]
    fn urect_lerp() {
        let a = URect::from_property_str("{{0,0},{0,0},{1,0},{1,0}}").unwrap();
        let b = URect::from_property_str("{{0,10},{0,10},{1,-10},{1,-10}}").unwrap();
        assert_eq!(
            a.lerp(&b, 0.5).to_property_string(),
            "{{0,5},{0,5},{1,-5},{1,-5}}"
        );
        assert!(URect::from_property_str("{{0,0},{0,0}}").is_err());
    }
}
