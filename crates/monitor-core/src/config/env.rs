use super::types::MonitorConfig;
use super::util::{env_non_empty, env_parsed};

impl MonitorConfig {
    pub(super) fn apply_env_overrides(&mut self) {
        self.apply_env_rule();
        self.apply_env_input();
        self.apply_env_report();
    }

    fn apply_env_rule(&mut self) {
        if let Some(v) = env_parsed("CLFGUARD_CATEGORY_COUNT") {
            self.rule.category_count = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_MIN_DIAG_RATIO") {
            self.rule.min_diag_ratio = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_MAX_OFF_DIAG_RATIO") {
            self.rule.max_off_diag_ratio = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_START_STEP") {
            self.rule.start_step = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_END_STEP") {
            self.rule.end_step = v;
        }
    }

    fn apply_env_input(&mut self) {
        if let Some(v) = env_non_empty("CLFGUARD_OBSERVATIONS") {
            self.observations_path = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_POLL_INTERVAL_SECS") {
            self.poll_interval_secs = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_POLL_BACKOFF_MAX_SECS") {
            self.poll_backoff_max_secs = v;
        }
        if let Some(v) = env_parsed("CLFGUARD_STOP_AFTER_END_STEP") {
            self.stop_after_end_step = v;
        }
    }

    fn apply_env_report(&mut self) {
        if let Some(v) = env_non_empty("CLFGUARD_REPORT_PATH") {
            self.report_path = Some(v);
        }
    }
}
