use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{HsvError, Result};
use crate::judgment::Judgment;

pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// On-disk layout of a config. Unknown fields are ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub judgments: Vec<JudgmentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub threshold: f64,

    #[serde(default)]
    pub text: String,

    /// `[r, g, b, a]`, each in `0.0..=1.0`.
    pub color: [f64; 4],

    #[serde(default)]
    pub fade: bool,
}

impl From<&Judgment> for JudgmentRecord {
    fn from(j: &Judgment) -> Self {
        Self {
            threshold: j.threshold(),
            text: j.text.clone(),
            color: j.color.to_rgba(),
            fade: j.fade,
        }
    }
}

impl JudgmentRecord {
    pub fn into_judgment(self) -> Result<Judgment> {
        let threshold = self.threshold;
        let bad = move |e: HsvError| {
            HsvError::format(format!("invalid judgment at threshold {threshold}: {e}"))
        };
        let [r, g, b, a] = self.color;
        let color = Color::new(r, g, b, a).map_err(bad)?;
        let judgment = Judgment::new(threshold, self.text).map_err(bad)?;
        Ok(judgment.with_color(color).with_fade(self.fade))
    }
}

impl ConfigFile {
    pub fn check_version(&self) -> Result<()> {
        if self.version > FORMAT_VERSION {
            return Err(HsvError::format(format!(
                "config format version {} is newer than supported version {FORMAT_VERSION}",
                self.version
            )));
        }
        Ok(())
    }
}
