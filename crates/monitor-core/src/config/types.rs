use rules::RuleConfig;

/// Effective monitor configuration after defaults, file and env layering.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Thresholds and step window handed to the rule core.
    pub rule: RuleConfig,
    /// JSONL file of per-step observation batches appended by the trainer.
    pub observations_path: String,
    pub poll_interval_secs: u64,
    pub poll_backoff_max_secs: u64,
    /// Stop once an observed step reaches `rule.end_step`.
    pub stop_after_end_step: bool,
    /// Optional file copy of the final JSON report (stdout always gets one).
    pub report_path: Option<String>,
}
