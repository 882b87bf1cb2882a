use std::fmt;
use std::str::FromStr;

use crate::error::{HsvError, Result};

/// Two colors compare equal when every channel is within this distance.
///
/// Slightly wider than half an 8-bit step so a color survives a trip through
/// its hex form.
pub const EPSILON: f64 = 0.002;

/// RGBA color with every channel in `0.0..=1.0`.
///
/// Constructors reject out-of-range input; derived colors (`lighten`,
/// `darken`, `interpolate`, ...) clamp their result.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
    Color { r, g, b, a }
}

const NAMED: [(&str, Color); 11] = [
    ("white", Color::WHITE),
    ("black", Color::BLACK),
    ("red", Color::RED),
    ("green", Color::GREEN),
    ("blue", Color::BLUE),
    ("yellow", Color::YELLOW),
    ("cyan", Color::CYAN),
    ("magenta", Color::MAGENTA),
    ("gray", Color::GRAY),
    ("orange", Color::ORANGE),
    ("transparent", Color::TRANSPARENT),
];

fn check_unit(channel: &str, v: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(HsvError::range(format!(
            "{channel} must be within 0.0..=1.0, got {v}"
        )))
    }
}

fn check_byte(channel: &str, v: i32) -> Result<u8> {
    u8::try_from(v)
        .map_err(|_| HsvError::range(format!("{channel} must be within 0..=255, got {v}")))
}

fn to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn nibble(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| HsvError::format(format!("'{c}' is not a hex digit")))
}

impl Color {
    pub const WHITE: Color = rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = rgba(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = rgba(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = rgba(1.0, 1.0, 0.0, 1.0);
    pub const CYAN: Color = rgba(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = rgba(1.0, 0.0, 1.0, 1.0);
    pub const GRAY: Color = rgba(0.5, 0.5, 0.5, 1.0);
    pub const ORANGE: Color = rgba(1.0, 0.5, 0.0, 1.0);
    pub const TRANSPARENT: Color = rgba(0.0, 0.0, 0.0, 0.0);

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Result<Self> {
        Ok(Self {
            r: check_unit("red", r)?,
            g: check_unit("green", g)?,
            b: check_unit("blue", b)?,
            a: check_unit("alpha", a)?,
        })
    }

    fn clamped(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Build from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let f = |v: u8| f64::from(v) / 255.0;
        Self {
            r: f(r),
            g: f(g),
            b: f(b),
            a: f(a),
        }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`; the `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let nibbles = digits.chars().map(nibble).collect::<Result<Vec<u8>>>()?;
        let bytes: Vec<u8> = match nibbles.len() {
            3 | 4 => nibbles.iter().map(|n| n * 17).collect(),
            6 | 8 => nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect(),
            n => {
                return Err(HsvError::format(format!(
                    "hex color '{hex}' has {n} digits, expected 3, 4, 6 or 8"
                )));
            }
        };

        let alpha = bytes.get(3).copied().unwrap_or(255);
        Ok(Self::from_rgba8(bytes[0], bytes[1], bytes[2], alpha))
    }

    pub fn from_rgb(r: i32, g: i32, b: i32) -> Result<Self> {
        Self::from_rgba(r, g, b, 255)
    }

    pub fn from_rgba(r: i32, g: i32, b: i32, a: i32) -> Result<Self> {
        Ok(Self::from_rgba8(
            check_byte("red", r)?,
            check_byte("green", g)?,
            check_byte("blue", b)?,
            check_byte("alpha", a)?,
        ))
    }

    pub fn from_rgb_tuple((r, g, b): (i32, i32, i32)) -> Result<Self> {
        Self::from_rgb(r, g, b)
    }

    /// Look up one of the named constants, ignoring case.
    pub fn named(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(n, _)| *n == name || (name == "grey" && *n == "gray"))
            .map(|(_, c)| *c)
    }

    /// Build from hue (degrees, wrapped), saturation and lightness.
    pub fn from_hsl(h: f64, s: f64, l: f64, a: f64) -> Result<Self> {
        if !h.is_finite() {
            return Err(HsvError::range(format!("hue must be finite, got {h}")));
        }
        let s = check_unit("saturation", s)?;
        let l = check_unit("lightness", l)?;
        let a = check_unit("alpha", a)?;

        let h = h.rem_euclid(360.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Ok(Self::clamped(r + m, g + m, b + m, a))
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    /// Move r, g, b toward 1.0 by `amount` of the remaining distance.
    pub fn lighten(&self, amount: f64) -> Result<Self> {
        let t = check_unit("lighten amount", amount)?;
        let up = |v: f64| v + (1.0 - v) * t;
        Ok(Self::clamped(up(self.r), up(self.g), up(self.b), self.a))
    }

    /// Move r, g, b toward 0.0 by `amount` of the remaining distance.
    pub fn darken(&self, amount: f64) -> Result<Self> {
        let t = check_unit("darken amount", amount)?;
        let down = |v: f64| v - v * t;
        Ok(Self::clamped(down(self.r), down(self.g), down(self.b), self.a))
    }

    pub fn with_alpha(&self, a: f64) -> Result<Self> {
        Ok(Self {
            a: check_unit("alpha", a)?,
            ..*self
        })
    }

    /// Linear interpolation across all four channels; `t` must be in `0..=1`.
    pub fn interpolate(&self, other: &Color, t: f64) -> Result<Self> {
        let t = check_unit("interpolation t", t)?;
        Ok(self.mix(other, t))
    }

    /// Unchecked `interpolate` for callers that compute `t` themselves.
    pub(crate) fn mix(&self, other: &Color, t: f64) -> Self {
        let lerp = |x: f64, y: f64| x + (y - x) * t;
        Self::clamped(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
            lerp(self.a, other.a),
        )
    }

    pub fn to_hex(&self, include_alpha: bool) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if include_alpha {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}")
        }
    }

    pub fn to_rgba(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [to_byte(self.r), to_byte(self.g), to_byte(self.b), to_byte(self.a)]
    }

    pub fn to_rgb_tuple(&self) -> (u8, u8, u8) {
        (to_byte(self.r), to_byte(self.g), to_byte(self.b))
    }

    /// Perceived brightness (Rec. 601 weights), alpha ignored.
    pub fn luminance(&self) -> f64 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = (delta / (1.0 - (2.0 * l - 1.0).abs())).min(1.0);
        let h = if max == self.r {
            60.0 * ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            60.0 * ((self.b - self.r) / delta + 2.0)
        } else {
            60.0 * ((self.r - self.g) / delta + 4.0)
        };
        (h, s, l)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.to_rgba()
            .iter()
            .zip(other.to_rgba())
            .all(|(x, y)| (x - y).abs() <= EPSILON)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(self.a < 1.0))
    }
}

impl FromStr for Color {
    type Err = HsvError;

    fn from_str(s: &str) -> Result<Self> {
        match Self::named(s) {
            Some(c) => Ok(c),
            None => Self::from_hex(s),
        }
    }
}

/// Channel-wise interpolation from `a` (at `t = 0`) to `b` (at `t = 1`).
pub fn color_interpolate(a: &Color, b: &Color, t: f64) -> Result<Color> {
    a.interpolate(b, t)
}
