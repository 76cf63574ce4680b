mod config;
mod ingest;
mod report;
mod runtime;

use anyhow::Result;
use tokio::signal;
use tracing::info;

use config::MonitorConfig;
use runtime::{MonitorRuntime, TickOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = MonitorConfig::load()?;
    let mut runtime = MonitorRuntime::new(config.clone())?;

    info!(
        observations = %config.observations_path,
        category_count = config.rule.category_count,
        min_diag_ratio = config.rule.min_diag_ratio,
        max_off_diag_ratio = config.rule.max_off_diag_ratio,
        start_step = config.rule.start_step,
        end_step = config.rule.end_step,
        "clfguard monitor started"
    );

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            outcome = runtime.tick() => {
                if outcome? == TickOutcome::Finished {
                    break;
                }
            }
        }
    }

    let report = runtime.into_report();
    report::emit(&report, config.report_path.as_deref())?;

    if report.summary.triggered {
        info!(
            first_violation_step = ?report.summary.first_violation_step,
            steps_violated = report.summary.steps_violated,
            "confusion rule triggered"
        );
        std::process::exit(1);
    }

    info!(
        steps_evaluated = report.summary.steps_evaluated,
        "clfguard monitor stopped, no violations"
    );
    Ok(())
}
