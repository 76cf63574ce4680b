use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::types::MonitorConfig;
use super::util::{env_non_empty, non_empty};

impl MonitorConfig {
    pub(super) fn apply_file_config(&mut self) -> Result<bool> {
        let Some(path) = resolve_config_path() else {
            return Ok(false);
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        let file_cfg: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("failed parsing TOML config {}", path.display()))?;

        self.apply_file_rule(file_cfg.rule);
        self.apply_file_input(file_cfg.input);
        self.apply_file_report(file_cfg.report);

        Ok(true)
    }

    fn apply_file_rule(&mut self, rule: Option<FileRuleConfig>) {
        let Some(rule) = rule else {
            return;
        };

        if let Some(v) = rule.category_count {
            self.rule.category_count = v;
        }
        if let Some(v) = rule.min_diag_ratio {
            self.rule.min_diag_ratio = v;
        }
        if let Some(v) = rule.max_off_diag_ratio {
            self.rule.max_off_diag_ratio = v;
        }
        if let Some(v) = rule.start_step {
            self.rule.start_step = v;
        }
        if let Some(v) = rule.end_step {
            self.rule.end_step = v;
        }
    }

    fn apply_file_input(&mut self, input: Option<FileInputConfig>) {
        let Some(input) = input else {
            return;
        };

        if let Some(v) = non_empty(input.observations_path) {
            self.observations_path = v;
        }
        if let Some(v) = input.poll_interval_secs {
            self.poll_interval_secs = v;
        }
        if let Some(v) = input.poll_backoff_max_secs {
            self.poll_backoff_max_secs = v;
        }
        if let Some(v) = input.stop_after_end_step {
            self.stop_after_end_step = v;
        }
    }

    fn apply_file_report(&mut self, report: Option<FileReportConfig>) {
        let Some(report) = report else {
            return;
        };

        if let Some(v) = non_empty(report.path) {
            self.report_path = Some(v);
        }
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    env_non_empty("CLFGUARD_CONFIG").map(PathBuf::from)
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    rule: Option<FileRuleConfig>,
    #[serde(default)]
    input: Option<FileInputConfig>,
    #[serde(default)]
    report: Option<FileReportConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileRuleConfig {
    #[serde(default)]
    category_count: Option<usize>,
    #[serde(default)]
    min_diag_ratio: Option<f64>,
    #[serde(default)]
    max_off_diag_ratio: Option<f64>,
    #[serde(default)]
    start_step: Option<u64>,
    #[serde(default)]
    end_step: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileInputConfig {
    #[serde(default)]
    observations_path: Option<String>,
    #[serde(default)]
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    poll_backoff_max_secs: Option<u64>,
    #[serde(default)]
    stop_after_end_step: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileReportConfig {
    #[serde(default)]
    path: Option<String>,
}
