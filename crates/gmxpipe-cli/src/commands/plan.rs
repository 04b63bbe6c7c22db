use crate::cli::PipelineArgs;
use crate::config::build_config;
use crate::error::Result;
use gmxpipe::workflows;
use tracing::info;

/// Prints the resolved stage plan without touching the working directory.
pub fn run(args: PipelineArgs) -> Result<()> {
    let config = build_config(&args)?;
    let plan = workflows::run::plan(&config.pipeline);
    plan.validate()?;
    info!("Resolved a plan of {} stages", plan.stages.len());

    println!("Required input files:");
    for name in &plan.preconditions {
        println!("  {}", name);
    }
    println!();

    for (index, stage) in plan.stages.iter().enumerate() {
        println!("{:>2}. {}", index + 1, stage.name);
        if !stage.inputs.is_empty() {
            println!("    needs:    {}", stage.inputs.join(", "));
        }
        if !stage.outputs.is_empty() {
            println!("    produces: {}", stage.outputs.join(", "));
        }
        for action in &stage.actions {
            println!("    - {}", action.describe());
        }
    }

    Ok(())
}
