use std::cmp::Ordering;

use crate::color::Color;
use crate::error::{HsvError, Result};

/// Finite score cutoff with a total order, used as the collection key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Threshold(f64);

impl Threshold {
    pub(crate) fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(HsvError::range(format!(
                "threshold must be a finite number, got {value}"
            )));
        }
        // -0.0 and 0.0 are one key
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// Search key for a runtime score. Infinite scores are fine here, NaN is not.
    pub(crate) fn probe(score: f64) -> Option<Self> {
        if score.is_nan() {
            None
        } else {
            Some(Self(if score == 0.0 { 0.0 } else { score }))
        }
    }

    pub(crate) fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Threshold {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Threshold {}

impl PartialOrd for Threshold {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Threshold {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A scoring rule: scores at or above `threshold` display `text` in `color`.
///
/// `==`, `<` and friends look at the threshold only, so judgments sort by
/// cutoff. Use [`Judgment::same_fields`] to compare content.
#[derive(Debug, Clone)]
pub struct Judgment {
    threshold: Threshold,
    pub text: String,
    pub color: Color,
    /// Hint for the renderer to fade the judgment out.
    pub fade: bool,
}

impl Judgment {
    pub fn new(threshold: f64, text: impl Into<String>) -> Result<Self> {
        Ok(Self {
            threshold: Threshold::new(threshold)?,
            text: text.into(),
            color: Color::default(),
            fade: false,
        })
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_fade(mut self, fade: bool) -> Self {
        self.fade = fade;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.value()
    }

    pub(crate) fn key(&self) -> Threshold {
        self.threshold
    }

    pub fn same_fields(&self, other: &Judgment) -> bool {
        self.threshold == other.threshold
            && self.text == other.text
            && self.color == other.color
            && self.fade == other.fade
    }
}

impl PartialEq for Judgment {
    fn eq(&self, other: &Self) -> bool {
        self.threshold == other.threshold
    }
}

impl Eq for Judgment {}

impl PartialOrd for Judgment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Judgment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.threshold.cmp(&other.threshold)
    }
}
