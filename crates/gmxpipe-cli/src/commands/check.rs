use crate::cli::PipelineArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use gmxpipe::core::preconditions;
use gmxpipe::engine::command::probe_engine;
use tracing::info;

/// Verifies the working directory and the engine installation without
/// running any pipeline stage.
pub fn run(args: PipelineArgs) -> Result<()> {
    let config = build_config(&args)?;
    let missing = preconditions::missing(&config.workdir, &config.pipeline.layout);

    if missing.is_empty() {
        println!(
            "✓ All {} required input files are present in {}",
            config.pipeline.layout.required_inputs().len(),
            config.workdir.display()
        );
    } else {
        for path in &missing {
            println!("✗ missing: {}", path.display());
        }
    }

    match probe_engine(&config.pipeline.engine.binary, &config.workdir) {
        Ok(()) => {
            info!("Engine '{}' responded", config.pipeline.engine.binary);
            println!("✓ Engine '{}' is available", config.pipeline.engine.binary);
        }
        Err(e) => {
            println!("✗ {}", e);
            return Err(e.into());
        }
    }

    if !missing.is_empty() {
        return Err(CliError::Argument(format!(
            "{} required input file(s) missing",
            missing.len()
        )));
    }

    Ok(())
}
