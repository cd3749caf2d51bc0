//! String codecs for property values.
//!
//! Every animatable property crosses the target boundary as a string. Each
//! supported value kind implements [`PropertyValue`] to parse itself from and
//! format itself to that string. The set of kinds is closed and checked at
//! compile time; there is no global type-keyed table.
//!
//! Number formatting follows `%g`-like shortest output (`1`, `0.5`, `-2.25`).

use crate::error::FormatError;

/// A value kind that can cross the string property boundary.
pub trait PropertyValue: Sized {
    /// Human readable name used in conversion errors.
    const TYPE_NAME: &'static str;

    fn from_property_str(s: &str) -> Result<Self, FormatError>;

    fn to_property_string(&self) -> String;
}

/// Format a float the way property strings expect it.
#[inline]
pub fn fmt_f32(v: f32) -> String {
    format!("{v}")
}

/// Parse a single float, reporting failures against `type_name`.
pub fn parse_f32(s: &str, type_name: &'static str) -> Result<f32, FormatError> {
    s.trim()
        .parse::<f32>()
        .map_err(|_| FormatError::new(type_name, s))
}

/// Parse `label:value` pairs separated by whitespace, e.g. `"x:1 y:2"`.
///
/// All `labels` must be present exactly once; unknown labels are rejected.
pub fn parse_labelled<const N: usize>(
    s: &str,
    labels: [&str; N],
    type_name: &'static str,
) -> Result<[f32; N], FormatError> {
    let mut out = [0.0f32; N];
    let mut seen = [false; N];
    for token in s.split_whitespace() {
        let (label, value) = token
            .split_once(':')
            .ok_or_else(|| FormatError::new(type_name, s))?;
        let idx = labels
            .iter()
            .position(|l| *l == label)
            .ok_or_else(|| FormatError::new(type_name, s))?;
        if seen[idx] {
            return Err(FormatError::new(type_name, s));
        }
        out[idx] = parse_f32(value, type_name).map_err(|_| FormatError::new(type_name, s))?;
        seen[idx] = true;
    }
    if seen.iter().all(|s| *s) {
        Ok(out)
    } else {
        Err(FormatError::new(type_name, s))
    }
}

/// Parse exactly `N` numbers out of a braced list such as `"{{0.5,10},{1,-4}}"`.
///
/// Braces and optional `label:` prefixes (`"{top:{0,1},...}"`) are ignored.
pub fn parse_braced<const N: usize>(
    s: &str,
    type_name: &'static str,
) -> Result<[f32; N], FormatError> {
    let flattened: String = s
        .chars()
        .map(|c| if c == '{' || c == '}' { ' ' } else { c })
        .collect();
    let mut out = [0.0f32; N];
    let mut count = 0usize;
    for token in flattened.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = match token.split_once(':') {
            Some((_, rest)) => rest,
            None => token,
        };
        if token.is_empty() {
            continue;
        }
        if count == N {
            return Err(FormatError::new(type_name, s));
        }
        out[count] = parse_f32(token, type_name).map_err(|_| FormatError::new(type_name, s))?;
        count += 1;
    }
    if count == N {
        Ok(out)
    } else {
        Err(FormatError::new(type_name, s))
    }
}

impl PropertyValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        Ok(s.to_string())
    }

    fn to_property_string(&self) -> String {
        self.clone()
    }
}

impl PropertyValue for f32 {
    const TYPE_NAME: &'static str = "float";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        parse_f32(s, Self::TYPE_NAME)
    }

    fn to_property_string(&self) -> String {
        fmt_f32(*self)
    }
}

impl PropertyValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        s.trim()
            .parse::<i32>()
            .map_err(|_| FormatError::new(Self::TYPE_NAME, s))
    }

    fn to_property_string(&self) -> String {
        self.to_string()
    }
}

impl PropertyValue for u32 {
    const TYPE_NAME: &'static str = "uint";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| FormatError::new(Self::TYPE_NAME, s))
    }

    fn to_property_string(&self) -> String {
        self.to_string()
    }
}

impl PropertyValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_property_str(s: &str) -> Result<Self, FormatError> {
        match s.trim() {
            "true" | "True" => Ok(true),
            "false" | "False" => Ok(false),
            _ => Err(FormatError::new(Self::TYPE_NAME, s)),
        }
    }

    fn to_property_string(&self) -> String {
        let s = if *self { "true" } else { "false" };
        s.to_string()
    }
}
