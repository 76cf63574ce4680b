use anyhow::{Context, Result};
use serde::Serialize;

use rules::{MonitorSummary, RuleConfig, RuleMonitor, StepEvaluation};

/// Final verdict document handed to whatever alerting sits downstream.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub rule: RuleConfig,
    pub summary: MonitorSummary,
    /// Retained violated-step evaluations with their matrix snapshots.
    pub violations: Vec<StepEvaluation>,
}

impl MonitorReport {
    pub fn new(rule: RuleConfig, monitor: &RuleMonitor) -> Self {
        Self {
            rule,
            summary: monitor.summary(),
            violations: monitor.violations().to_vec(),
        }
    }
}

/// Write the report as JSON to stdout and, when configured, to a file.
pub fn emit(report: &MonitorReport, path: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed serializing monitor report")?;
    println!("{json}");
    if let Some(path) = path {
        std::fs::write(path, &json)
            .with_context(|| format!("failed writing report to {path}"))?;
    }
    Ok(())
}
