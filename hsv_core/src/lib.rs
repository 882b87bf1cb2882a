use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

pub mod color;
pub mod color_input;
pub mod error;
pub mod judgment;
pub mod merge;
pub mod schema;
pub mod scheme;
pub mod textart;

pub use color::{Color, color_interpolate};
pub use color_input::ColorInput;
pub use error::{HsvError, Result};
pub use judgment::Judgment;
pub use merge::{MergeStrategy, merge_configs};
pub use scheme::{SchemeType, generate_color_scheme};
pub use textart::{
    Cell, ImageSource, PatternType, TextArt, TextArtOptions, create_pattern, from_image,
    gradient_text,
};

use judgment::Threshold;
use schema::{ConfigFile, JudgmentRecord};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// A named set of judgments, at most one per threshold.
///
/// This is the document we save/load. Scores resolve to the judgment with the
/// highest threshold that is still `<=` the score.
#[derive(Debug, Clone, Default)]
pub struct HsvConfig {
    judgments: BTreeMap<Threshold, Judgment>,
}

impl HsvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a judgment, replacing any at the same threshold.
    ///
    /// `color` takes anything [`ColorInput`] converts from: a [`Color`], a hex
    /// string or name, 3/4 floats, or 3/4 bytes. Nothing changes on error.
    ///
    /// ```
    /// # fn main() -> hsv_core::Result<()> {
    /// let mut config = hsv_core::HsvConfig::new();
    /// config
    ///     .add(100.0, "GOOD", "#0000FF", false)?
    ///     .add(115.0, "PERFECT", [1.0, 1.0, 0.0], true)?;
    /// assert_eq!(config.get_judgment_for_score(113.0).map(|j| j.text.as_str()), Some("GOOD"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn add(
        &mut self,
        threshold: f64,
        text: impl Into<String>,
        color: impl Into<ColorInput>,
        fade: bool,
    ) -> Result<&mut Self> {
        let color = color.into().resolve()?;
        let judgment = Judgment::new(threshold, text)?
            .with_color(color)
            .with_fade(fade);
        Ok(self.insert(judgment))
    }

    /// Add a judgment whose text is the image rendered as colored text art.
    pub fn add_image(
        &mut self,
        threshold: f64,
        image: impl Into<ImageSource>,
        max_width: u32,
        fade: bool,
    ) -> Result<&mut Self> {
        self.add_image_with(threshold, image, &TextArtOptions::new(max_width), fade)
    }

    /// [`HsvConfig::add_image`] with full control over sampling.
    ///
    /// The text holds `<color=#RRGGBBAA>` markup; the judgment's own color stays
    /// the neutral default.
    pub fn add_image_with(
        &mut self,
        threshold: f64,
        image: impl Into<ImageSource>,
        options: &TextArtOptions,
        fade: bool,
    ) -> Result<&mut Self> {
        let mut judgment = Judgment::new(threshold, String::new())?.with_fade(fade);
        let art = textart::from_image_with(&image.into(), options)?;
        judgment.text = art.to_markup();
        Ok(self.insert(judgment))
    }

    /// Insert a whole judgment, replacing any at the same threshold.
    pub fn insert(&mut self, judgment: Judgment) -> &mut Self {
        let threshold = judgment.threshold();
        if self.judgments.insert(judgment.key(), judgment).is_some() {
            debug!(threshold, "replaced judgment");
        } else {
            debug!(threshold, "added judgment");
        }
        self
    }

    /// Remove the judgment at `threshold`; absent thresholds are ignored.
    pub fn remove(&mut self, threshold: f64) -> &mut Self {
        if let Some(key) = Threshold::probe(threshold) {
            if self.judgments.remove(&key).is_some() {
                debug!(threshold, "removed judgment");
            }
        }
        self
    }

    /// The judgment with the greatest threshold `<= score`, if any.
    pub fn get_judgment_for_score(&self, score: f64) -> Option<&Judgment> {
        let key = Threshold::probe(score)?;
        self.judgments.range(..=key).next_back().map(|(_, j)| j)
    }

    pub fn get(&self, threshold: f64) -> Option<&Judgment> {
        self.judgments.get(&Threshold::probe(threshold)?)
    }

    /// Mutable access to text, color and fade; the threshold is fixed.
    pub fn get_mut(&mut self, threshold: f64) -> Option<&mut Judgment> {
        self.judgments.get_mut(&Threshold::probe(threshold)?)
    }

    pub fn len(&self) -> usize {
        self.judgments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judgments.is_empty()
    }

    /// Judgments in ascending threshold order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Judgment> {
        self.judgments.values()
    }

    /// Judgments in resolution priority order (highest threshold first).
    pub fn iter_descending(&self) -> impl Iterator<Item = &Judgment> {
        self.judgments.values().rev()
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.judgments.keys().map(|k| k.value()).collect()
    }

    pub fn to_json_string(&self) -> Result<String> {
        let file = ConfigFile {
            version: schema::FORMAT_VERSION,
            judgments: self.iter().map(JudgmentRecord::from).collect(),
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| HsvError::format(format!("serialize config: {e}")))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(text)
            .map_err(|e| HsvError::format(format!("parse config json: {e}")))?;
        file.check_version()?;

        let mut judgments = BTreeMap::new();
        for record in file.judgments {
            let judgment = record.into_judgment()?;
            let threshold = judgment.threshold();
            if judgments.insert(judgment.key(), judgment).is_some() {
                warn!(threshold, "duplicate threshold in config, keeping the later entry");
            }
        }
        Ok(Self { judgments })
    }

    /// Save the config to JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json)
            .map_err(|e| HsvError::resource(format!("config file '{}'", path.display()), e))?;
        debug!(path = %path.display(), judgments = self.len(), "saved config");
        Ok(())
    }

    /// Load the config from JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| HsvError::resource(format!("config file '{}'", path.display()), e))?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), judgments = config.len(), "loaded config");
        Ok(config)
    }
}

/// Field-by-field equality; colors compare within [`color::EPSILON`].
impl PartialEq for HsvConfig {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.same_fields(b))
    }
}
