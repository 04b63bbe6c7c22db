use crate::core::textedit::TextEdit;
use crate::engine::command::ToolCommand;
use crate::engine::error::EngineError;
use std::collections::HashSet;

/// One action within a stage, executed in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAction {
    /// Invoke an external tool and wait for it.
    Invoke(ToolCommand),
    /// Copy an artifact, e.g. seeding the complex from the processed receptor.
    Copy { from: String, to: String },
    /// Apply a text mutation to an artifact.
    Edit(TextEdit),
}

impl StageAction {
    pub fn describe(&self) -> String {
        match self {
            StageAction::Invoke(cmd) => format!("$ {}", cmd.rendered()),
            StageAction::Copy { from, to } => format!("copy '{}' -> '{}'", from, to),
            StageAction::Edit(edit) => edit.describe(),
        }
    }
}

/// A pipeline stage: its name, the artifacts it requires and produces, and
/// the ordered actions realizing it.
///
/// Inputs and outputs are declared by artifact name so a whole plan can be
/// dependency-checked before anything executes. A file mutated in place
/// (like the system topology) appears in both lists.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub name: &'static str,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub actions: Vec<StageAction>,
}

impl StageSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inputs: Vec::new(),
            outputs: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn input(mut self, artifact: impl Into<String>) -> Self {
        self.inputs.push(artifact.into());
        self
    }

    pub fn output(mut self, artifact: impl Into<String>) -> Self {
        self.outputs.push(artifact.into());
        self
    }

    pub fn invoke(mut self, cmd: ToolCommand) -> Self {
        self.actions.push(StageAction::Invoke(cmd));
        self
    }

    pub fn copy(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.actions.push(StageAction::Copy {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn edit(mut self, edit: TextEdit) -> Self {
        self.actions.push(StageAction::Edit(edit));
        self
    }
}

/// An ordered list of stages plus the precondition files assumed to exist
/// before the first stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub preconditions: Vec<String>,
    pub stages: Vec<StageSpec>,
}

impl Plan {
    /// Checks that every stage input is either a precondition file or the
    /// declared output of an earlier stage.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut available: HashSet<&str> =
            self.preconditions.iter().map(String::as_str).collect();

        for stage in &self.stages {
            for input in &stage.inputs {
                if !available.contains(input.as_str()) {
                    return Err(EngineError::UnsatisfiedInput {
                        stage: stage.name.to_string(),
                        artifact: input.clone(),
                    });
                }
            }
            available.extend(stage.outputs.iter().map(String::as_str));
        }
        Ok(())
    }

    /// Every artifact some stage declares as output, in production order.
    pub fn declared_outputs(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut outputs = Vec::new();
        for stage in &self.stages {
            for output in &stage.outputs {
                if seen.insert(output.as_str()) {
                    outputs.push(output.as_str());
                }
            }
        }
        outputs
    }
}
