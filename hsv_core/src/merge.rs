use std::str::FromStr;

use tracing::debug;

use crate::HsvConfig;
use crate::error::{HsvError, Result};
use crate::judgment::Judgment;

/// How [`merge_configs`] settles two judgments at the same threshold.
///
/// Configs are visited in order, so "earlier" and "later" refer to their
/// position in the input slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The later judgment replaces the earlier one.
    Unique,
    /// The earlier judgment is kept.
    First,
    /// Later text, colors mixed half-way, fade if either fades.
    Blend,
}

impl FromStr for MergeStrategy {
    type Err = HsvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unique" => Ok(MergeStrategy::Unique),
            "first" => Ok(MergeStrategy::First),
            "blend" => Ok(MergeStrategy::Blend),
            _ => Err(HsvError::format(format!("unknown merge strategy '{s}'"))),
        }
    }
}

impl MergeStrategy {
    fn settle(self, earlier: &Judgment, later: &Judgment) -> Judgment {
        match self {
            MergeStrategy::Unique => later.clone(),
            MergeStrategy::First => earlier.clone(),
            MergeStrategy::Blend => later
                .clone()
                .with_color(earlier.color.mix(&later.color, 0.5))
                .with_fade(earlier.fade || later.fade),
        }
    }

    /// Combine `configs` into a new config; the inputs are left untouched.
    pub fn merge(self, configs: &[HsvConfig]) -> Result<HsvConfig> {
        if configs.is_empty() {
            return Err(HsvError::Value("cannot merge an empty list of configs".into()));
        }

        let mut out = HsvConfig::new();
        let mut collisions = 0usize;
        for config in configs {
            for judgment in config.iter() {
                let merged = match out.get(judgment.threshold()) {
                    None => judgment.clone(),
                    Some(existing) => {
                        collisions += 1;
                        self.settle(existing, judgment)
                    }
                };
                out.insert(merged);
            }
        }

        debug!(
            strategy = ?self,
            inputs = configs.len(),
            collisions,
            judgments = out.len(),
            "merged configs"
        );
        Ok(out)
    }
}

pub fn merge_configs(configs: &[HsvConfig], strategy: &str) -> Result<HsvConfig> {
    strategy.parse::<MergeStrategy>()?.merge(configs)
}
