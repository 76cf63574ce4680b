use anyhow::Result;

use super::types::MonitorConfig;

impl MonitorConfig {
    /// Defaults, then the optional TOML file, then env overrides. Threshold
    /// validity is the rule core's concern and is checked when the rule is
    /// built, never clamped here.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_file_config()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }
}
