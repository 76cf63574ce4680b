use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use rules::{ConfusionRule, RuleMonitor, StepResult};

use crate::config::MonitorConfig;
use crate::ingest::{BatchReader, ObservationBatch};
use crate::report::MonitorReport;

/// Backoff doubles at most this many times over the base poll interval.
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// New batches were consumed.
    Progressed,
    /// Nothing new; the tick slept with backoff.
    Idle,
    /// The watched step window is complete.
    Finished,
}

pub struct MonitorRuntime {
    config: MonitorConfig,
    rule: ConfusionRule,
    monitor: RuleMonitor,
    reader: BatchReader,
    idle_polls: u32,
    finished: bool,
}

impl MonitorRuntime {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let rule = ConfusionRule::new(config.rule.clone()).context("invalid rule configuration")?;
        let reader = BatchReader::new(&config.observations_path);
        Ok(Self {
            config,
            rule,
            monitor: RuleMonitor::new(),
            reader,
            idle_polls: 0,
            finished: false,
        })
    }

    /// One poll of the observation stream. Sleeps (with bounded exponential
    /// backoff) only when there was nothing to consume, so a caller
    /// selecting on cancellation interrupts an idle monitor, not a busy one.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        if self.finished {
            return Ok(TickOutcome::Finished);
        }

        let batches = self.reader.poll()?;
        if batches.is_empty() {
            let delay = self.backoff_delay();
            self.idle_polls = self.idle_polls.saturating_add(1);
            tokio::time::sleep(delay).await;
            return Ok(TickOutcome::Idle);
        }
        self.idle_polls = 0;

        for batch in &batches {
            self.observe_batch(batch)?;
            if self.config.stop_after_end_step && batch.step >= self.config.rule.end_step {
                self.finished = true;
                info!(step = batch.step, "end of evaluation window reached");
                return Ok(TickOutcome::Finished);
            }
        }
        Ok(TickOutcome::Progressed)
    }

    fn observe_batch(&mut self, batch: &ObservationBatch) -> Result<()> {
        let result = self
            .rule
            .evaluate_step(batch.step, &batch.true_labels, &batch.predicted_labels)
            .with_context(|| format!("rejecting observation batch for step {}", batch.step))?;

        match &result {
            StepResult::Skipped { step } => {
                debug!(step = *step, "step outside evaluation window, skipped");
            }
            StepResult::Evaluated(eval) if eval.violated => {
                warn!(
                    step = eval.step,
                    violating_cells = eval.violating_cells.len(),
                    samples = eval.matrix.total(),
                    "confusion thresholds violated"
                );
            }
            StepResult::Evaluated(eval) => {
                debug!(
                    step = eval.step,
                    samples = eval.matrix.total(),
                    "step within thresholds"
                );
            }
        }

        self.monitor.observe(&result);
        Ok(())
    }

    fn backoff_delay(&self) -> Duration {
        let base = self.config.poll_interval_secs.max(1);
        let ceiling = self.config.poll_backoff_max_secs.max(base);
        let doublings = self.idle_polls.min(MAX_BACKOFF_DOUBLINGS);
        let secs = base.saturating_mul(1 << doublings).min(ceiling);
        Duration::from_secs(secs)
    }

    pub fn into_report(self) -> MonitorReport {
        MonitorReport::new(self.rule.config().clone(), &self.monitor)
    }
}

#[cfg(test)]
mod tests {
    use rules::RuleConfig;

    use super::*;
    use crate::config::MonitorConfig;

    fn test_config(path: &std::path::Path, end_step: u64) -> MonitorConfig {
        MonitorConfig {
            rule: RuleConfig {
                category_count: 3,
                min_diag_ratio: 0.2,
                max_off_diag_ratio: 0.3,
                start_step: 1,
                end_step,
            },
            observations_path: path.display().to_string(),
            poll_interval_secs: 1,
            poll_backoff_max_secs: 8,
            stop_after_end_step: true,
            report_path: None,
        }
    }

    fn line(step: u64, true_labels: &str, predicted_labels: &str) -> String {
        format!(
            "{{\"step\":{step},\"true_labels\":{true_labels},\"predicted_labels\":{predicted_labels}}}\n"
        )
    }

    #[tokio::test]
    async fn consumes_stream_and_finishes_at_end_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.jsonl");
        let mut content = String::new();
        // Step 0 is before the window, step 1 passes, step 2 is degenerate.
        content.push_str(&line(0, "[0,1,2]", "[2,1,0]"));
        content.push_str(&line(1, "[0,0,1,1,2]", "[0,0,1,1,2]"));
        content.push_str(&line(2, "[0,0,1,1,2]", "[0,1,1,1,2]"));
        std::fs::write(&path, content).unwrap();

        let mut runtime = MonitorRuntime::new(test_config(&path, 2)).unwrap();
        assert_eq!(runtime.tick().await.unwrap(), TickOutcome::Finished);
        // Finished state is sticky.
        assert_eq!(runtime.tick().await.unwrap(), TickOutcome::Finished);

        let report = runtime.into_report();
        assert!(report.summary.triggered);
        assert_eq!(report.summary.first_violation_step, Some(2));
        assert_eq!(report.summary.steps_skipped, 1);
        assert_eq!(report.summary.steps_evaluated, 2);
        assert_eq!(report.summary.steps_violated, 1);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].step, 2);
    }

    #[tokio::test]
    async fn idle_tick_backs_off_and_resumes_on_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.jsonl");

        let mut runtime = MonitorRuntime::new(test_config(&path, 100)).unwrap();
        assert_eq!(runtime.backoff_delay(), Duration::from_secs(1));
        assert_eq!(runtime.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(runtime.backoff_delay(), Duration::from_secs(2));
        assert_eq!(runtime.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(runtime.backoff_delay(), Duration::from_secs(4));
        // Bounded by poll_backoff_max_secs.
        runtime.idle_polls = 20;
        assert_eq!(runtime.backoff_delay(), Duration::from_secs(8));

        std::fs::write(&path, line(1, "[0,0,1,1,2]", "[0,0,1,1,2]")).unwrap();
        assert_eq!(runtime.tick().await.unwrap(), TickOutcome::Progressed);
        assert_eq!(runtime.backoff_delay(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn malformed_batch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.jsonl");
        // Label 7 is out of range for category_count = 3.
        std::fs::write(&path, line(1, "[0,7]", "[0,1]")).unwrap();

        let mut runtime = MonitorRuntime::new(test_config(&path, 100)).unwrap();
        let err = runtime.tick().await.unwrap_err();
        assert!(err.to_string().contains("step 1"));
    }

    #[test]
    fn invalid_rule_config_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir.path().join("obs.jsonl"), 100);
        config.rule.min_diag_ratio = 1.5;
        assert!(MonitorRuntime::new(config).is_err());
    }
}
