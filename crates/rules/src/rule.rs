use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matrix::ConfusionMatrix;
use crate::types::{StepEvaluation, StepResult, ThresholdKind, ViolatingCell};

/// Configuration for one evaluation run. Immutable once the rule is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Number of label categories K; labels live in `[0, K)`.
    pub category_count: usize,
    /// Floor every diagonal ratio must reach.
    pub min_diag_ratio: f64,
    /// Ceiling no off-diagonal ratio may exceed.
    pub max_off_diag_ratio: f64,
    /// First step evaluated, inclusive.
    pub start_step: u64,
    /// Last step evaluated, inclusive.
    pub end_step: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoCategories,
    RatioOutOfRange { name: &'static str, value: f64 },
    InvertedWindow { start_step: u64, end_step: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCategories => write!(f, "category_count must be at least 1"),
            Self::RatioOutOfRange { name, value } => {
                write!(f, "{name} {value} not in [0, 1]")
            }
            Self::InvertedWindow {
                start_step,
                end_step,
            } => {
                write!(f, "start_step {start_step} is after end_step {end_step}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    LengthMismatch {
        true_len: usize,
        predicted_len: usize,
    },
    LabelOutOfRange {
        index: usize,
        label: usize,
        category_count: usize,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                true_len,
                predicted_len,
            } => {
                write!(
                    f,
                    "label sequence length mismatch: {true_len} true vs {predicted_len} predicted"
                )
            }
            Self::LabelOutOfRange {
                index,
                label,
                category_count,
            } => {
                write!(
                    f,
                    "label {label} at index {index} out of range for {category_count} categories"
                )
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Per-step confusion-matrix quality rule.
///
/// Holds no mutable state: `evaluate_step` builds a fresh matrix per call,
/// so one rule may be shared by concurrent callers evaluating independent
/// batches.
#[derive(Debug, Clone)]
pub struct ConfusionRule {
    config: RuleConfig,
}

impl ConfusionRule {
    pub fn new(config: RuleConfig) -> Result<Self, ConfigError> {
        if config.category_count < 1 {
            return Err(ConfigError::NoCategories);
        }
        for (name, value) in [
            ("min_diag_ratio", config.min_diag_ratio),
            ("max_off_diag_ratio", config.max_off_diag_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        if config.start_step > config.end_step {
            return Err(ConfigError::InvertedWindow {
                start_step: config.start_step,
                end_step: config.end_step,
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Evaluate one step's batch of index-aligned (true, predicted) labels.
    ///
    /// Steps outside `[start_step, end_step]` come back `Skipped` whatever
    /// their label values; a length mismatch is rejected regardless of the
    /// step. For in-window steps every label is range-checked before any
    /// matrix cell is written, so a failed call leaves no partial matrix.
    pub fn evaluate_step(
        &self,
        step: u64,
        true_labels: &[usize],
        predicted_labels: &[usize],
    ) -> Result<StepResult, InputError> {
        if true_labels.len() != predicted_labels.len() {
            return Err(InputError::LengthMismatch {
                true_len: true_labels.len(),
                predicted_len: predicted_labels.len(),
            });
        }
        if step < self.config.start_step || step > self.config.end_step {
            return Ok(StepResult::Skipped { step });
        }

        let k = self.config.category_count;
        for (index, (&true_class, &predicted_class)) in
            true_labels.iter().zip(predicted_labels).enumerate()
        {
            for label in [true_class, predicted_class] {
                if label >= k {
                    return Err(InputError::LabelOutOfRange {
                        index,
                        label,
                        category_count: k,
                    });
                }
            }
        }

        let mut matrix = ConfusionMatrix::new(k);
        for (&true_class, &predicted_class) in true_labels.iter().zip(predicted_labels) {
            matrix.record(true_class, predicted_class);
        }

        let mut violating_cells = Vec::new();

        let diagonal_total = matrix.diagonal_total();
        for class in 0..k {
            let ratio = ratio(matrix.count(class, class), diagonal_total);
            if ratio < self.config.min_diag_ratio {
                violating_cells.push(ViolatingCell {
                    true_class: class,
                    predicted_class: class,
                    ratio,
                    threshold: ThresholdKind::DiagBelowMin,
                });
            }
        }

        for predicted_class in 0..k {
            let column_total = matrix.column_total(predicted_class);
            for true_class in 0..k {
                if true_class == predicted_class {
                    continue;
                }
                let ratio = ratio(matrix.count(true_class, predicted_class), column_total);
                if ratio > self.config.max_off_diag_ratio {
                    violating_cells.push(ViolatingCell {
                        true_class,
                        predicted_class,
                        ratio,
                        threshold: ThresholdKind::OffDiagAboveMax,
                    });
                }
            }
        }

        let violated = !violating_cells.is_empty();
        Ok(StepResult::Evaluated(StepEvaluation {
            step,
            matrix,
            violated,
            violating_cells,
        }))
    }
}

/// A zero denominator means no mass in that normalization slice; the ratio
/// is defined as 0 so every cell stays comparable across steps.
fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}

/// True when any evaluated result violated its thresholds. Skipped steps
/// never contribute.
pub fn overall_verdict(results: &[StepResult]) -> bool {
    results.iter().any(StepResult::is_violated)
}
