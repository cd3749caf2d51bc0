//! Colours and four-corner colour rectangles.
//!
//! Components are stored as floats (nominally 0..1) so blending never clips
//! mid-way; the `AARRGGBB` text form clamps and rounds each channel.

use serde::{Deserialize, Serialize};

use crate::blend::{lerp_f32, Accumulate, Interpolate};
use crate::codec::PropertyValue;
use crate::error::FormatError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub alpha: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Default for Colour {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

impl Colour {
    pub fn new(alpha: f32, red: f32, green: f32, blue: f32) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(24), channel(16), channel(8), channel(0))
    }

    pub fn to_argb(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.alpha) << 24)
            | (channel(self.red) << 16)
            | (channel(self.green) << 8)
            | channel(self.blue)
    }

    fn map2(&self, o: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(
            f(self.alpha, o.alpha),
            f(self.red, o.red),
            f(self.green, o.green),
            f(self.blue, o.blue),
        )
    }
}

impl PropertyValue for Colour {
    const TYPE_NAME: &'static str = "Colour";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let hex = s.trim();
        if hex.is_empty() || hex.len() > 8 {
            return Err(FormatError::new(Self::TYPE_NAME, s));
        }
        u32::from_str_radix(hex, 16)
            .map(Self::from_argb)
            .map_err(|_| FormatError::new(Self::TYPE_NAME, s))
    }

    fn to_property_string(&self) -> String {
        format!("{:08X}", self.to_argb())
    }
}

impl Accumulate for Colour {
    fn accumulate(&self, o: &Self) -> Self {
        self.map2(o, |a, b| a + b)
    }
}

impl Interpolate for Colour {
    fn difference(&self, o: &Self) -> Self {
        self.map2(o, |a, b| a - b)
    }

    fn scale(&self, f: f32) -> Self {
        Self::new(self.alpha * f, self.red * f, self.green * f, self.blue * f)
    }

    fn lerp(&self, o: &Self, t: f32) -> Self {
        self.map2(o, |a, b| lerp_f32(a, b, t))
    }
}

/// One colour per corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColourRect {
    pub top_left: Colour,
    pub top_right: Colour,
    pub bottom_left: Colour,
    pub bottom_right: Colour,
}

impl ColourRect {
    pub fn uniform(colour: Colour) -> Self {
        Self {
            top_left: colour,
            top_right: colour,
            bottom_left: colour,
            bottom_right: colour,
        }
    }

    fn map2(&self, o: &Self, f: impl Fn(&Colour, &Colour) -> Colour) -> Self {
        Self {
            top_left: f(&self.top_left, &o.top_left),
            top_right: f(&self.top_right, &o.top_right),
            bottom_left: f(&self.bottom_left, &o.bottom_left),
            bottom_right: f(&self.bottom_right, &o.bottom_right),
        }
    }
}

impl PropertyValue for ColourRect {
    const TYPE_NAME: &'static str = "ColourRect";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        let mut corners: [Option<Colour>; 4] = [None; 4];
        for token in s.split_whitespace() {
            let (label, hex) = token
                .split_once(':')
                .ok_or_else(|| FormatError::new(Self::TYPE_NAME, s))?;
            let idx = match label {
                "tl" => 0,
                "tr" => 1,
                "bl" => 2,
                "br" => 3,
                _ => return Err(FormatError::new(Self::TYPE_NAME, s)),
            };
            let colour =
                Colour::from_property_str(hex).map_err(|_| FormatError::new(Self::TYPE_NAME, s))?;
            corners[idx] = Some(colour);
        }
        match corners {
            [Some(top_left), Some(top_right), Some(bottom_left), Some(bottom_right)] => Ok(Self {
                top_left,
                top_right,
                bottom_left,
                bottom_right,
            }),
            _ => Err(FormatError::new(Self::TYPE_NAME, s)),
        }
    }

    fn to_property_string(&self) -> String {
        format!(
            "tl:{} tr:{} bl:{} br:{}",
            self.top_left.to_property_string(),
            self.top_right.to_property_string(),
            self.bottom_left.to_property_string(),
            self.bottom_right.to_property_string()
        )
    }
}

impl Accumulate for ColourRect {
    fn accumulate(&self, o: &Self) -> Self {
        self.map2(o, Colour::accumulate)
    }
}

impl Interpolate for ColourRect {
    fn difference(&self, o: &Self) -> Self {
        self.map2(o, Colour::difference)
    }

    fn scale(&self, f: f32) -> Self {
        self.map2(self, |c, _| c.scale(f))
    }

    fn lerp(&self, o: &Self, t: f32) -> Self {
        self.map2(o, |a, b| a.lerp(b, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Colour::from_property_str("FF00FF80").unwrap();
        assert_eq!(c.alpha, 1.0);
        assert_eq!(c.green, 1.0);
        assert_eq!(c.to_property_string(), "FF00FF80");
        assert!(Colour::from_property_str("GG000000").is_err());
        assert!(Colour::from_property_str("FF00FF0000").is_err());
    }

    #[test]
    fn channels_clamp_when_formatted() {
        let c = Colour::new(2.0, -1.0, 0.5, 1.0);
        assert_eq!(c.to_property_string(), "FF0080FF");
    }

    #[test]
    fn colour_rect_needs_all_corners() {
        let text = "tl:FF000000 tr:FFFFFFFF bl:00000000 br:80808080";
        let rect = ColourRect::from_property_str(text).unwrap();
        assert_eq!(rect.to_property_string(), text);
        assert!(ColourRect::from_property_str("tl:FF000000 tr:FFFFFFFF").is_err());
    }

    #[test]
    fn colour_midpoint() {
        let black = Colour::from_argb(0xFF000000);
        let white = Colour::from_argb(0xFFFFFFFF);
        assert_eq!(black.lerp(&white, 0.5).to_property_string(), "FF808080");
    }
}
