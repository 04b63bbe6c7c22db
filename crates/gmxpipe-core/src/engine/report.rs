use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Completed,
    Failed,
    /// Not attempted because an earlier stage failed under the abort policy.
    Skipped,
}

/// One external invocation as it actually ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandRecord {
    pub program: String,
    pub args: Vec<String>,
    pub exit_code: Option<i32>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StageReport {
    pub name: String,
    pub status: StageStatus,
    pub duration_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandRecord>,
}

impl StageReport {
    pub fn completed(name: &str, commands: Vec<CommandRecord>, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: StageStatus::Completed,
            duration_secs: elapsed.as_secs_f64(),
            error: None,
            commands,
        }
    }

    pub fn failed(
        name: &str,
        commands: Vec<CommandRecord>,
        elapsed: Duration,
        error: String,
    ) -> Self {
        Self {
            name: name.to_string(),
            status: StageStatus::Failed,
            duration_secs: elapsed.as_secs_f64(),
            error: Some(error),
            commands,
        }
    }

    pub fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StageStatus::Skipped,
            duration_secs: 0.0,
            error: None,
            commands: Vec::new(),
        }
    }
}

/// Machine-readable record of one pipeline run, written to the working
/// directory whether the run succeeded or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunReport {
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: StageReport) {
        self.stages.push(stage);
    }

    pub fn success(&self) -> bool {
        self.stages
            .iter()
            .all(|stage| stage.status == StageStatus::Completed)
    }

    /// Name of the first failed stage, if any.
    pub fn first_failure(&self) -> Option<&str> {
        self.stages
            .iter()
            .find(|stage| stage.status == StageStatus::Failed)
            .map(|stage| stage.name.as_str())
    }

    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|err| EngineError::Report(err.to_string()))
    }

    pub fn write(&self, path: &Path) -> Result<(), EngineError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
