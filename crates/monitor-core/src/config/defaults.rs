use rules::RuleConfig;

use super::types::MonitorConfig;

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rule: RuleConfig {
                category_count: 2,
                min_diag_ratio: 0.9,
                max_off_diag_ratio: 0.1,
                start_step: 0,
                // Unbounded unless the file or env narrows the window.
                end_step: u64::MAX,
            },
            observations_path: "observations.jsonl".to_string(),
            poll_interval_secs: 2,
            poll_backoff_max_secs: 60,
            stop_after_end_step: true,
            report_path: None,
        }
    }
}
