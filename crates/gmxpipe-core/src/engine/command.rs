use crate::engine::error::EngineError;
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, trace};

/// One external tool invocation: program, arguments, and an optional stdin
/// feed for tools that read group selections interactively.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, feed: impl Into<String>) -> Self {
        self.stdin = Some(feed.into());
        self
    }

    /// Shell-like rendering for logs and plan printing.
    pub fn rendered(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }
}

/// Captured result of one external invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Runs external tools one at a time, blocking until each completes, with
/// stdout and stderr captured in full.
pub struct CommandRunner;

impl CommandRunner {
    /// Executes `cmd` with `dir` as its working directory.
    ///
    /// `stage` is only used to contextualize errors. A non-zero exit is not
    /// an error here; the caller applies its continuation policy.
    pub fn run(cmd: &ToolCommand, dir: &Path, stage: &str) -> Result<CommandOutput, EngineError> {
        debug!("[{}] $ {}", stage, cmd.rendered());

        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .current_dir(dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                stage: stage.to_string(),
                program: cmd.program.clone(),
                source,
            })?;

        if let Some(feed) = &cmd.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                // The child may exit without draining its stdin; a broken
                // pipe here is not a failure of the invocation.
                let _ = stdin.write_all(feed.as_bytes());
            }
        }
        drop(child.stdin.take());

        let output = child.wait_with_output()?;
        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        };
        trace!("[{}] {} -> {}", stage, cmd.program, result.status);
        Ok(result)
    }
}

/// Confirms the simulation engine is launchable before any stage runs.
///
/// Replaces the legacy "engine environment sourced" check: the engine binary
/// must exist and report a version.
pub fn probe_engine(binary: &str, dir: &Path) -> Result<(), EngineError> {
    let probe = ToolCommand::new(binary).arg("--version");
    let output = CommandRunner::run(&probe, dir, "engine-probe").map_err(|err| {
        EngineError::EngineUnavailable {
            program: binary.to_string(),
            reason: err.to_string(),
        }
    })?;
    if !output.success() {
        return Err(EngineError::EngineUnavailable {
            program: binary.to_string(),
            reason: format!("version probe exited with {}", output.status),
        });
    }
    debug!("Engine probe succeeded for '{}'", binary);
    Ok(())
}
