use crate::cli::PipelineArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use gmxpipe::core::files::RUN_REPORT;
use gmxpipe::engine::progress::ProgressReporter;
use gmxpipe::workflows;
use tracing::info;

pub fn run(args: PipelineArgs) -> Result<()> {
    let config = build_config(&args)?;
    info!(
        "Running pipeline in {} with engine '{}'",
        config.workdir.display(),
        config.pipeline.engine.binary
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting protein-ligand pipeline...");
    let report = workflows::run::execute(&config.workdir, &config.pipeline, &reporter)?;

    let completed = report
        .stages
        .iter()
        .filter(|s| s.status == gmxpipe::engine::report::StageStatus::Completed)
        .count();
    println!(
        "✓ {} of {} stages completed. Report written to: {}",
        completed,
        report.stages.len(),
        config.workdir.join(RUN_REPORT).display()
    );

    Ok(())
}
