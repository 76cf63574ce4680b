use serde::Serialize;

use crate::types::{StepEvaluation, StepResult};

/// Maximum violated-step snapshots retained for the report (all violations
/// are still counted).
const MAX_RETAINED_VIOLATIONS: usize = 32;

/// Latched aggregation over a stream of step results.
///
/// Triggering is monotonic: the first violated step latches the monitor and
/// later passing steps do not un-trigger it.
#[derive(Debug, Clone, Default)]
pub struct RuleMonitor {
    triggered: bool,
    first_violation_step: Option<u64>,
    steps_evaluated: usize,
    steps_skipped: usize,
    steps_violated: usize,
    violations: Vec<StepEvaluation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorSummary {
    pub triggered: bool,
    pub first_violation_step: Option<u64>,
    pub steps_evaluated: usize,
    pub steps_skipped: usize,
    pub steps_violated: usize,
}

impl RuleMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, result: &StepResult) {
        match result {
            StepResult::Skipped { .. } => {
                self.steps_skipped += 1;
            }
            StepResult::Evaluated(eval) => {
                self.steps_evaluated += 1;
                if !eval.violated {
                    return;
                }
                self.steps_violated += 1;
                if !self.triggered {
                    self.triggered = true;
                    self.first_violation_step = Some(eval.step);
                }
                if self.violations.len() < MAX_RETAINED_VIOLATIONS {
                    self.violations.push(eval.clone());
                }
            }
        }
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub fn first_violation_step(&self) -> Option<u64> {
        self.first_violation_step
    }

    /// Retained violated-step evaluations, oldest first.
    pub fn violations(&self) -> &[StepEvaluation] {
        &self.violations
    }

    pub fn summary(&self) -> MonitorSummary {
        MonitorSummary {
            triggered: self.triggered,
            first_violation_step: self.first_violation_step,
            steps_evaluated: self.steps_evaluated,
            steps_skipped: self.steps_skipped,
            steps_violated: self.steps_violated,
        }
    }
}
