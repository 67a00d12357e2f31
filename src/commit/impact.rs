//! Impact scoring: blends the model's rating with a change-size heuristic.
//!
//! ```text
//! mean  = sum(last 10 change sizes) / 10
//! ratio = current / mean            (0 when mean is 0)
//! h     = ratio / (ratio + 1)
//! score = 100 * (w_model * rating / 10 + w_history * h)
//! ```

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::git::HISTORY_DEPTH;
use crate::llm::reply::MAX_RATING;

/// Allowed drift when checking that the weights sum to one.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Relative weights of the model rating and the size heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactWeights {
    model: f64,
    history: f64,
}

impl ImpactWeights {
    /// Validate and build a weight pair. Both must be finite, non-negative
    /// and sum to 1.
    pub fn new(model: f64, history: f64) -> Result<Self, ConfigError> {
        let valid = model.is_finite()
            && history.is_finite()
            && model >= 0.0
            && history >= 0.0
            && ((model + history) - 1.0).abs() <= WEIGHT_TOLERANCE;

        if !valid {
            return Err(ConfigError::InvalidWeights { model, history });
        }

        Ok(Self { model, history })
    }

    pub fn model(&self) -> f64 {
        self.model
    }

    pub fn history(&self) -> f64 {
        self.history
    }
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            model: 0.5,
            history: 0.5,
        }
    }
}

/// How to score when fewer than 10 past commits are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HistoryPolicy {
    /// Missing commits count as size 0; the mean still divides by 10.
    #[default]
    ZeroFill,
    /// Drop the size heuristic and score on the model rating alone.
    Skip,
    /// Treat the heuristic as 0 unless a full window is available.
    RequireFull,
}

/// A blended impact score in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ImpactScore(f64);

impl ImpactScore {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for ImpactScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Bounded transform of a size ratio into `[0, 1)`.
pub fn heuristic(ratio: f64) -> f64 {
    if ratio <= 0.0 || !ratio.is_finite() {
        return 0.0;
    }
    ratio / (ratio + 1.0)
}

/// Scores changes against recent history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactScorer {
    weights: ImpactWeights,
    policy: HistoryPolicy,
}

impl ImpactScorer {
    pub fn new(weights: ImpactWeights, policy: HistoryPolicy) -> Self {
        Self { weights, policy }
    }

    /// Score a change of `current` lines rated `rating` by the model.
    ///
    /// `history` holds the sizes of recent commits, newest first; only the
    /// first 10 are considered.
    pub fn score(&self, rating: u8, current: u64, history: &[u64]) -> ImpactScore {
        let window = &history[..history.len().min(HISTORY_DEPTH)];
        let model_term = f64::from(rating.min(MAX_RATING)) / f64::from(MAX_RATING);
        let full = window.len() == HISTORY_DEPTH;

        let raw = match self.policy {
            HistoryPolicy::Skip if !full => {
                debug!(
                    "Only {} of {HISTORY_DEPTH} past commits, scoring on model rating alone",
                    window.len()
                );
                100.0 * model_term
            }
            HistoryPolicy::RequireFull if !full => {
                debug!(
                    "Only {} of {HISTORY_DEPTH} past commits, size heuristic disabled",
                    window.len()
                );
                100.0 * self.weights.model * model_term
            }
            _ => {
                let ratio = size_ratio(current, window);
                100.0 * (self.weights.model * model_term + self.weights.history * heuristic(ratio))
            }
        };

        ImpactScore(raw.clamp(0.0, 100.0))
    }
}

/// `current / mean(window)`, with the mean always taken over 10 slots.
fn size_ratio(current: u64, window: &[u64]) -> f64 {
    let total: u64 = window.iter().sum();
    let mean = total as f64 / HISTORY_DEPTH as f64;
    if mean == 0.0 {
        return 0.0;
    }
    current as f64 / mean
}
