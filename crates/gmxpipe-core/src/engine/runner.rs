use crate::engine::command::CommandRunner;
use crate::engine::config::{FailurePolicy, PipelineConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{CommandRecord, RunReport, StageReport};
use crate::engine::stage::{Plan, StageAction, StageSpec};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Sequential executor for a validated [`Plan`].
///
/// One stage at a time, one external process at a time, no retries and no
/// timeouts. Stage failures are captured in the [`RunReport`]; under
/// [`FailurePolicy::Abort`] the remaining stages are recorded as skipped,
/// under [`FailurePolicy::Continue`] execution presses on, legacy style.
pub struct PipelineRunner<'a> {
    config: &'a PipelineConfig,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(config: &'a PipelineConfig, reporter: &'a ProgressReporter<'a>) -> Self {
        Self { config, reporter }
    }

    /// Validates the plan's dependency graph, then executes it in `dir`.
    ///
    /// The returned report covers every stage; inspect
    /// [`RunReport::success`] for the overall outcome.
    pub fn execute(&self, plan: &Plan, dir: &Path) -> Result<RunReport, EngineError> {
        plan.validate()?;

        self.reporter.report(Progress::RunStart {
            total_stages: plan.stages.len() as u64,
        });

        let mut report = RunReport::new();
        let mut aborted = false;
        for stage in &plan.stages {
            if aborted {
                report.push(StageReport::skipped(stage.name));
                continue;
            }

            self.reporter.report(Progress::StageStart { name: stage.name });
            info!("Stage '{}' starting", stage.name);
            let started = Instant::now();
            let mut records = Vec::new();

            match self.run_stage(stage, dir, &mut records) {
                Ok(()) => {
                    info!("Stage '{}' completed", stage.name);
                    report.push(StageReport::completed(stage.name, records, started.elapsed()));
                    self.reporter.report(Progress::StageFinish);
                }
                Err(err) => {
                    error!("Stage '{}' failed: {}", stage.name, err);
                    self.reporter
                        .report(Progress::Message(format!("stage '{}' failed", stage.name)));
                    report.push(StageReport::failed(
                        stage.name,
                        records,
                        started.elapsed(),
                        err.to_string(),
                    ));
                    if self.config.failure_policy == FailurePolicy::Abort {
                        aborted = true;
                    } else {
                        warn!(
                            "Continuing past failed stage '{}'; later stages may act on stale or absent files",
                            stage.name
                        );
                    }
                }
            }
        }

        self.reporter.report(Progress::RunFinish);
        Ok(report)
    }

    fn run_stage(
        &self,
        stage: &StageSpec,
        dir: &Path,
        records: &mut Vec<CommandRecord>,
    ) -> Result<(), EngineError> {
        for input in &stage.inputs {
            if !dir.join(input).exists() {
                return Err(EngineError::InputNotFound {
                    stage: stage.name.to_string(),
                    artifact: input.clone(),
                });
            }
        }

        for action in &stage.actions {
            match action {
                StageAction::Invoke(cmd) => {
                    let output = CommandRunner::run(cmd, dir, stage.name)?;
                    records.push(CommandRecord {
                        program: cmd.program.clone(),
                        args: cmd.args.clone(),
                        exit_code: output.exit_code(),
                        success: output.success(),
                    });
                    if !output.success() {
                        return Err(EngineError::CommandFailed {
                            stage: stage.name.to_string(),
                            program: cmd.program.clone(),
                            status: output.status.to_string(),
                            stderr: output.stderr.trim_end().to_string(),
                        });
                    }
                }
                StageAction::Copy { from, to } => {
                    std::fs::copy(dir.join(from), dir.join(to)).map_err(|source| {
                        EngineError::Copy {
                            stage: stage.name.to_string(),
                            from: from.clone(),
                            to: to.clone(),
                            source,
                        }
                    })?;
                }
                StageAction::Edit(edit) => {
                    edit.apply(dir).map_err(|source| EngineError::Edit {
                        stage: stage.name.to_string(),
                        source,
                    })?;
                }
            }
        }

        for output in &stage.outputs {
            if !dir.join(output).exists() {
                return Err(EngineError::OutputNotProduced {
                    stage: stage.name.to_string(),
                    artifact: output.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::command::ToolCommand;
    use crate::engine::config::PipelineConfigBuilder;
    use crate::engine::report::StageStatus;
    use std::fs;
    use tempfile::tempdir;

    fn shell(script: &str) -> ToolCommand {
        ToolCommand::new("sh").args(["-c", script])
    }

    fn config(policy: FailurePolicy) -> PipelineConfig {
        PipelineConfigBuilder::new()
            .failure_policy(policy)
            .build()
            .unwrap()
    }

    #[test]
    fn runs_stages_in_order_and_reports_completion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("seed.txt"), "s").unwrap();
        let plan = Plan {
            preconditions: vec!["seed.txt".to_string()],
            stages: vec![
                StageSpec::new("first")
                    .input("seed.txt")
                    .output("a.txt")
                    .invoke(shell("echo one > a.txt")),
                StageSpec::new("second")
                    .input("a.txt")
                    .output("b.txt")
                    .invoke(shell("cat a.txt > b.txt")),
            ],
        };
        let config = config(FailurePolicy::Abort);
        let reporter = ProgressReporter::new();

        let report = PipelineRunner::new(&config, &reporter)
            .execute(&plan, dir.path())
            .unwrap();

        assert!(report.success());
        assert_eq!(report.stages.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("b.txt")).unwrap().trim(),
            "one"
        );
    }

    #[test]
    fn abort_policy_skips_everything_after_a_failure() {
        let dir = tempdir().unwrap();
        let plan = Plan {
            preconditions: Vec::new(),
            stages: vec![
                StageSpec::new("breaks").invoke(shell("echo doomed >&2; exit 7")),
                StageSpec::new("never-runs").invoke(shell("touch should-not-exist.txt")),
            ],
        };
        let config = config(FailurePolicy::Abort);
        let reporter = ProgressReporter::new();

        let report = PipelineRunner::new(&config, &reporter)
            .execute(&plan, dir.path())
            .unwrap();

        assert!(!report.success());
        assert_eq!(report.stages[0].status, StageStatus::Failed);
        assert_eq!(report.stages[0].commands[0].exit_code, Some(7));
        assert!(report.stages[0].error.as_deref().unwrap().contains("doomed"));
        assert_eq!(report.stages[1].status, StageStatus::Skipped);
        assert!(!dir.path().join("should-not-exist.txt").exists());
    }

    #[test]
    fn continue_policy_presses_on_past_a_failure() {
        let dir = tempdir().unwrap();
        let plan = Plan {
            preconditions: Vec::new(),
            stages: vec![
                StageSpec::new("breaks").invoke(shell("exit 1")),
                StageSpec::new("still-runs").output("later.txt").invoke(shell("touch later.txt")),
            ],
        };
        let config = config(FailurePolicy::Continue);
        let reporter = ProgressReporter::new();

        let report = PipelineRunner::new(&config, &reporter)
            .execute(&plan, dir.path())
            .unwrap();

        assert!(!report.success());
        assert_eq!(report.first_failure(), Some("breaks"));
        assert_eq!(report.stages[1].status, StageStatus::Completed);
        assert!(dir.path().join("later.txt").exists());
    }

    #[test]
    fn a_stage_fails_when_its_input_is_absent_on_disk() {
        let dir = tempdir().unwrap();
        // Valid graph (the precondition declares the file), missing on disk.
        let plan = Plan {
            preconditions: vec!["never-created.txt".to_string()],
            stages: vec![StageSpec::new("needs-input")
                .input("never-created.txt")
                .invoke(shell("touch unreachable.txt"))],
        };
        let config = config(FailurePolicy::Abort);
        let reporter = ProgressReporter::new();

        let report = PipelineRunner::new(&config, &reporter)
            .execute(&plan, dir.path())
            .unwrap();

        assert_eq!(report.stages[0].status, StageStatus::Failed);
        assert!(report.stages[0].error.as_deref().unwrap().contains("never-created.txt"));
        // The input gate fires before any tool is invoked.
        assert!(report.stages[0].commands.is_empty());
        assert!(!dir.path().join("unreachable.txt").exists());
    }

    #[test]
    fn an_undeclared_output_fails_the_stage() {
        let dir = tempdir().unwrap();
        let plan = Plan {
            preconditions: Vec::new(),
            stages: vec![StageSpec::new("claims-too-much")
                .output("promised.txt")
                .invoke(shell("true"))],
        };
        let config = config(FailurePolicy::Abort);
        let reporter = ProgressReporter::new();

        let report = PipelineRunner::new(&config, &reporter)
            .execute(&plan, dir.path())
            .unwrap();

        assert_eq!(report.stages[0].status, StageStatus::Failed);
        assert!(report.stages[0].error.as_deref().unwrap().contains("promised.txt"));
    }

    #[test]
    fn an_invalid_plan_is_rejected_before_any_execution() {
        let dir = tempdir().unwrap();
        let plan = Plan {
            preconditions: Vec::new(),
            stages: vec![StageSpec::new("orphan")
                .input("ghost.txt")
                .invoke(shell("touch ran.txt"))],
        };
        let config = config(FailurePolicy::Abort);
        let reporter = ProgressReporter::new();

        let result = PipelineRunner::new(&config, &reporter).execute(&plan, dir.path());
        assert!(matches!(result, Err(EngineError::UnsatisfiedInput { .. })));
        assert!(!dir.path().join("ran.txt").exists());
    }
}
