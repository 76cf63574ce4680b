use serde::Serialize;

use crate::matrix::ConfusionMatrix;

/// Which threshold a cell failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThresholdKind {
    /// Diagonal ratio fell below `min_diag_ratio`.
    DiagBelowMin,
    /// Off-diagonal ratio exceeded `max_off_diag_ratio`.
    OffDiagAboveMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViolatingCell {
    pub true_class: usize,
    pub predicted_class: usize,
    /// The normalized ratio that failed its threshold.
    pub ratio: f64,
    pub threshold: ThresholdKind,
}

/// Full evaluation of one in-window step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepEvaluation {
    pub step: u64,
    pub matrix: ConfusionMatrix,
    pub violated: bool,
    pub violating_cells: Vec<ViolatingCell>,
}

/// Outcome of feeding one step's batch through the rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepResult {
    /// Step outside the configured window; nothing was computed.
    Skipped { step: u64 },
    Evaluated(StepEvaluation),
}

impl StepResult {
    pub fn step(&self) -> u64 {
        match self {
            Self::Skipped { step } => *step,
            Self::Evaluated(eval) => eval.step,
        }
    }

    pub fn is_violated(&self) -> bool {
        matches!(self, Self::Evaluated(eval) if eval.violated)
    }

    pub fn as_evaluated(&self) -> Option<&StepEvaluation> {
        match self {
            Self::Skipped { .. } => None,
            Self::Evaluated(eval) => Some(eval),
        }
    }
}
