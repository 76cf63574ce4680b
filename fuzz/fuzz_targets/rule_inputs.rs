#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

use rules::{ConfusionRule, RuleConfig, RuleMonitor};

static RULE: Lazy<ConfusionRule> = Lazy::new(|| {
    ConfusionRule::new(RuleConfig {
        category_count: 8,
        min_diag_ratio: 0.6,
        max_off_diag_ratio: 0.2,
        start_step: 4,
        end_step: 192,
    })
    .expect("fuzz rule config")
});

fuzz_target!(|data: &[u8]| {
    let step = data.first().copied().unwrap_or_default() as u64;
    let rest = data.get(1..).unwrap_or_default();
    let half = rest.len() / 2;

    // Modulo 9 leaves one value out of range for K = 8.
    let true_labels: Vec<usize> = rest[..half].iter().map(|b| *b as usize % 9).collect();
    let predicted_labels: Vec<usize> = rest[half..half * 2].iter().map(|b| *b as usize % 9).collect();

    let mut monitor = RuleMonitor::new();
    if let Ok(result) = RULE.evaluate_step(step, &true_labels, &predicted_labels) {
        monitor.observe(&result);
    }
});
