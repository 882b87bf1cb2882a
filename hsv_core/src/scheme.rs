use std::str::FromStr;

use crate::color::Color;
use crate::error::{HsvError, Result};

/// Hue distance between neighbours in an analogous scheme, in degrees.
pub const ANALOGOUS_STEP: f64 = 30.0;

/// Lightness shift applied each time a scheme's hue set repeats.
pub const LIGHTNESS_STEP: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeType {
    /// Base hue, then +30°, -30°, +60°, -60°, ...
    Analogous,
    /// Base and its opposite (180°).
    Complementary,
    /// Three hues 120° apart.
    Triadic,
    /// Base plus the two neighbours of its complement (150°, 210°).
    SplitComplementary,
    /// Four hues 90° apart.
    Tetradic,
    /// One hue, lightness stepped.
    Monochromatic,
}

impl FromStr for SchemeType {
    type Err = HsvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "analogous" => Ok(SchemeType::Analogous),
            "complementary" => Ok(SchemeType::Complementary),
            "triadic" => Ok(SchemeType::Triadic),
            "split_complementary" => Ok(SchemeType::SplitComplementary),
            "tetradic" => Ok(SchemeType::Tetradic),
            "monochromatic" => Ok(SchemeType::Monochromatic),
            _ => Err(HsvError::format(format!("unknown color scheme '{s}'"))),
        }
    }
}

impl SchemeType {
    /// Hue offset (degrees) and repetition round of the `i`-th color.
    fn step(self, i: usize) -> (f64, usize) {
        let cycle = |offsets: &[f64]| (offsets[i % offsets.len()], i / offsets.len());
        match self {
            SchemeType::Analogous => {
                let k = ((i + 1) / 2) as f64;
                let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
                (sign * k * ANALOGOUS_STEP, 0)
            }
            SchemeType::Complementary => cycle(&[0.0, 180.0]),
            SchemeType::Triadic => cycle(&[0.0, 120.0, 240.0]),
            SchemeType::SplitComplementary => cycle(&[0.0, 150.0, 210.0]),
            SchemeType::Tetradic => cycle(&[0.0, 90.0, 180.0, 270.0]),
            SchemeType::Monochromatic => (0.0, i),
        }
    }

    /// `count` colors derived from `base`, first one being `base` itself.
    pub fn generate(self, base: &Color, count: usize) -> Result<Vec<Color>> {
        if count == 0 {
            return Err(HsvError::range("color scheme count must be at least 1"));
        }

        let (h, s, l) = base.to_hsl();
        (0..count)
            .map(|i| {
                let (offset, round) = self.step(i);
                Color::from_hsl(h + offset, s, shift_lightness(l, round), base.a())
            })
            .collect()
    }
}

/// Odd rounds go lighter, even rounds darker, by growing steps.
fn shift_lightness(l: f64, round: usize) -> f64 {
    if round == 0 {
        return l;
    }
    let delta = LIGHTNESS_STEP * round.div_ceil(2) as f64;
    let shifted = if round % 2 == 1 { l + delta } else { l - delta };
    shifted.clamp(0.0, 1.0)
}

pub fn generate_color_scheme(base: &Color, scheme_type: &str, count: usize) -> Result<Vec<Color>> {
    scheme_type.parse::<SchemeType>()?.generate(base, count)
}
