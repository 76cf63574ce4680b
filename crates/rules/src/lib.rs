mod matrix;
mod monitor;
mod rule;
mod types;

pub use matrix::ConfusionMatrix;
pub use monitor::{MonitorSummary, RuleMonitor};
pub use rule::{overall_verdict, ConfigError, ConfusionRule, InputError, RuleConfig};
pub use types::{StepEvaluation, StepResult, ThresholdKind, ViolatingCell};
