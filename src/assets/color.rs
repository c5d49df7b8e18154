use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::PlacardError;

/// Straight-alpha sRGB color as edited in the UI (`#rrggbb` from a color input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = PlacardError;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()/rgba()`, `hsl()/hsla()` and the bare
    /// `"h s% l%"` triple stored in CSS custom properties.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map_err(PlacardError::validation);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, &["hsla", "hsl"]) {
            return parse_hsl_args(&args).map_err(PlacardError::validation);
        }
        if let Some(args) = function_args(&lower, &["rgba", "rgb"]) {
            return parse_rgb_args(&args).map_err(PlacardError::validation);
        }
        if lower.contains('%') {
            let args: Vec<&str> = lower.split_whitespace().collect();
            return parse_hsl_args(&args).map_err(PlacardError::validation);
        }
        match lower.as_str() {
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::WHITE),
            "transparent" => Ok(Self::rgba(0, 0, 0, 0)),
            _ => Err(PlacardError::validation(format!("unsupported color \"{s}\""))),
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn function_args<'a>(s: &'a str, names: &[&str]) -> Option<Vec<&'a str>> {
    for name in names {
        let Some(rest) = s.strip_prefix(name) else {
            continue;
        };
        let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
        let args = inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        return Some(args);
    }
    None
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    match s.len() {
        3 => Ok(Color::rgb(
            hex_nibble(&s[0..1])?,
            hex_nibble(&s[1..2])?,
            hex_nibble(&s[2..3])?,
        )),
        6 => Ok(Color::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Color::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid color component \"{s}\""))
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let v = parse_number(s.trim_end_matches('%'))?;
    Ok((v / 100.0).clamp(0.0, 1.0))
}

fn parse_alpha(s: Option<&&str>) -> Result<f64, String> {
    match s {
        None => Ok(1.0),
        Some(s) if s.ends_with('%') => parse_percent(s),
        Some(s) => Ok(parse_number(s)?.clamp(0.0, 1.0)),
    }
}

fn to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_rgb_args(args: &[&str]) -> Result<Color, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("rgb() takes 3 or 4 components".to_owned());
    }
    let channel = |s: &str| -> Result<u8, String> {
        if s.ends_with('%') {
            Ok(to_u8(parse_percent(s)?))
        } else {
            Ok(parse_number(s)?.clamp(0.0, 255.0).round() as u8)
        }
    };
    Ok(Color::rgba(
        channel(args[0])?,
        channel(args[1])?,
        channel(args[2])?,
        to_u8(parse_alpha(args.get(3))?),
    ))
}

fn parse_hsl_args(args: &[&str]) -> Result<Color, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("hsl() takes 3 or 4 components".to_owned());
    }
    let h = parse_number(args[0].trim_end_matches("deg"))?;
    let s = parse_percent(args[1])?;
    let l = parse_percent(args[2])?;
    let a = parse_alpha(args.get(3))?;
    let (r, g, b) = hsl_to_rgb(h, s, l);
    Ok(Color::rgba(to_u8(r), to_u8(g), to_u8(b), to_u8(a)))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    // Standard HSL -> RGB conversion (sRGB space, normalized 0..1 inputs).
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
