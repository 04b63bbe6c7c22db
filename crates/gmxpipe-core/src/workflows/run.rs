use crate::core::files::RUN_REPORT;
use crate::core::preconditions;
use crate::engine::command::probe_engine;
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::RunReport;
use crate::engine::runner::PipelineRunner;
use crate::engine::stage::Plan;
use crate::workflows::{analysis, simulate};
use std::path::Path;
use tracing::{info, instrument};

/// Assembles the full stage plan: preparation through production, then
/// post-processing and analysis.
pub fn plan(config: &PipelineConfig) -> Plan {
    let mut stages = simulate::stages(config);
    stages.extend(analysis::stages(config));
    Plan {
        preconditions: config
            .layout
            .required_inputs()
            .into_iter()
            .map(String::from)
            .collect(),
        stages,
    }
}

/// Runs the complete pipeline in `dir`.
///
/// Order of gates: precondition files first (no external tool is invoked
/// when one is missing), then the engine probe, then plan validation. The
/// run report is written to the working directory whether the run succeeded
/// or failed.
#[instrument(skip_all, name = "pipeline_run")]
pub fn execute(
    dir: &Path,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<RunReport, EngineError> {
    preconditions::check(dir, &config.layout)?;
    probe_engine(&config.engine.binary, dir)?;

    let plan = plan(config);
    info!(
        "Executing {} stages in {}",
        plan.stages.len(),
        dir.display()
    );

    let runner = PipelineRunner::new(config, reporter);
    let report = runner.execute(&plan, dir)?;

    report.write(&dir.join(RUN_REPORT))?;
    reporter.report(Progress::Message(format!("run report: {}", RUN_REPORT)));

    if let Some(stage) = report.first_failure() {
        return Err(EngineError::PipelineFailed {
            stage: stage.to_string(),
        });
    }
    info!("Pipeline completed: {} stages", report.stages.len());
    Ok(report)
}
