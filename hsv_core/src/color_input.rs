use std::str::FromStr;

use crate::color::Color;
use crate::error::{HsvError, Result};

/// Anything accepted where a color is expected.
///
/// Resolved once with [`ColorInput::resolve`]; the rest of the crate only sees
/// [`Color`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColorInput {
    Color(Color),
    /// Hex literal or color name.
    Hex(String),
    /// 3 or 4 channels in `0.0..=1.0`.
    Floats(Vec<f64>),
    /// 3 or 4 channels in `0..=255`.
    Bytes(Vec<i32>),
}

fn channel_count(kind: &str, n: usize) -> Result<()> {
    if n == 3 || n == 4 {
        Ok(())
    } else {
        Err(HsvError::format(format!(
            "{kind} color needs 3 or 4 channels, got {n}"
        )))
    }
}

impl ColorInput {
    pub fn resolve(&self) -> Result<Color> {
        match self {
            ColorInput::Color(c) => Ok(*c),
            ColorInput::Hex(s) => s.parse(),
            ColorInput::Floats(v) => {
                channel_count("float", v.len())?;
                Color::new(v[0], v[1], v[2], v.get(3).copied().unwrap_or(1.0))
            }
            ColorInput::Bytes(v) => {
                channel_count("byte", v.len())?;
                Color::from_rgba(v[0], v[1], v[2], v.get(3).copied().unwrap_or(255))
            }
        }
    }
}

/// Parses a color literal as typed on a command line.
///
/// `#hex` and names become [`ColorInput::Hex`]. Comma-separated channels become
/// [`ColorInput::Floats`] when any channel has a decimal point, otherwise
/// [`ColorInput::Bytes`].
impl FromStr for ColorInput {
    type Err = HsvError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if !s.contains(',') {
            return Ok(ColorInput::Hex(s.to_string()));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let bad = |p: &str| HsvError::format(format!("'{p}' is not a color channel in '{s}'"));

        if parts.iter().any(|p| p.contains('.')) {
            let floats = parts
                .iter()
                .map(|&p| p.parse::<f64>().map_err(|_| bad(p)))
                .collect::<Result<Vec<_>>>()?;
            Ok(ColorInput::Floats(floats))
        } else {
            let bytes = parts
                .iter()
                .map(|&p| p.parse::<i32>().map_err(|_| bad(p)))
                .collect::<Result<Vec<_>>>()?;
            Ok(ColorInput::Bytes(bytes))
        }
    }
}

impl From<Color> for ColorInput {
    fn from(c: Color) -> Self {
        ColorInput::Color(c)
    }
}

impl From<&Color> for ColorInput {
    fn from(c: &Color) -> Self {
        ColorInput::Color(*c)
    }
}

impl From<&str> for ColorInput {
    fn from(s: &str) -> Self {
        ColorInput::Hex(s.to_string())
    }
}

impl From<String> for ColorInput {
    fn from(s: String) -> Self {
        ColorInput::Hex(s)
    }
}

impl From<[f64; 3]> for ColorInput {
    fn from(v: [f64; 3]) -> Self {
        ColorInput::Floats(v.to_vec())
    }
}

impl From<[f64; 4]> for ColorInput {
    fn from(v: [f64; 4]) -> Self {
        ColorInput::Floats(v.to_vec())
    }
}

impl From<Vec<f64>> for ColorInput {
    fn from(v: Vec<f64>) -> Self {
        ColorInput::Floats(v)
    }
}

impl From<[i32; 3]> for ColorInput {
    fn from(v: [i32; 3]) -> Self {
        ColorInput::Bytes(v.to_vec())
    }
}

impl From<[i32; 4]> for ColorInput {
    fn from(v: [i32; 4]) -> Self {
        ColorInput::Bytes(v.to_vec())
    }
}

impl From<[u8; 3]> for ColorInput {
    fn from(v: [u8; 3]) -> Self {
        ColorInput::Bytes(v.iter().map(|&b| i32::from(b)).collect())
    }
}

impl From<[u8; 4]> for ColorInput {
    fn from(v: [u8; 4]) -> Self {
        ColorInput::Bytes(v.iter().map(|&b| i32::from(b)).collect())
    }
}

impl From<(i32, i32, i32)> for ColorInput {
    fn from((r, g, b): (i32, i32, i32)) -> Self {
        ColorInput::Bytes(vec![r, g, b])
    }
}

impl From<Vec<i32>> for ColorInput {
    fn from(v: Vec<i32>) -> Self {
        ColorInput::Bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_form_resolves_to_the_same_color() -> anyhow::Result<()> {
        let inputs: Vec<ColorInput> = vec![
            Color::RED.into(),
            "#FF0000".into(),
            "red".into(),
            [1.0, 0.0, 0.0].into(),
            [1.0, 0.0, 0.0, 1.0].into(),
            [255i32, 0, 0].into(),
            [255u8, 0, 0, 255].into(),
            (255i32, 0, 0).into(),
        ];
        for input in inputs {
            assert_eq!(input.resolve()?, Color::RED, "{input:?}");
        }
        Ok(())
    }

    #[test]
    fn bad_inputs_fail_with_the_color_error_kind() {
        let r = ColorInput::from([1.5, 0.0, 0.0]).resolve();
        assert!(matches!(r, Err(HsvError::Range(_))));

        let r = ColorInput::from([0i32, 0, 256]).resolve();
        assert!(matches!(r, Err(HsvError::Range(_))));

        let r = ColorInput::from(vec![0.1, 0.2]).resolve();
        assert!(matches!(r, Err(HsvError::Format(_))));

        let r = ColorInput::from("#12345").resolve();
        assert!(matches!(r, Err(HsvError::Format(_))));
    }

    #[test]
    fn parses_command_line_literals() -> anyhow::Result<()> {
        assert_eq!(
            "0, 128, 255".parse::<ColorInput>()?,
            ColorInput::Bytes(vec![0, 128, 255])
        );
        assert_eq!(
            "1.0,0,0,0.5".parse::<ColorInput>()?,
            ColorInput::Floats(vec![1.0, 0.0, 0.0, 0.5])
        );
        assert_eq!("#abc".parse::<ColorInput>()?, ColorInput::Hex("#abc".into()));
        assert!(matches!(
            "1,x,3".parse::<ColorInput>(),
            Err(HsvError::Format(_))
        ));
        Ok(())
    }
}
