use crate::core::preconditions::PreconditionError;
use crate::core::textedit::TextEditError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Simulation engine '{program}' is not available: {reason}")]
    EngineUnavailable { program: String, reason: String },

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(
        "Invalid plan: stage '{stage}' consumes '{artifact}', which no earlier stage produces and no precondition provides"
    )]
    UnsatisfiedInput { stage: String, artifact: String },

    #[error("Stage '{stage}': required input '{artifact}' does not exist on disk")]
    InputNotFound { stage: String, artifact: String },

    #[error("Stage '{stage}': failed to launch '{program}': {source}")]
    Spawn {
        stage: String,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Stage '{stage}': '{program}' exited with {status}: {stderr}")]
    CommandFailed {
        stage: String,
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Stage '{stage}': declared output '{artifact}' was not produced")]
    OutputNotProduced { stage: String, artifact: String },

    #[error("Stage '{stage}': text edit failed: {source}")]
    Edit {
        stage: String,
        #[source]
        source: TextEditError,
    },

    #[error("Stage '{stage}': failed to copy '{from}' to '{to}': {source}")]
    Copy {
        stage: String,
        from: String,
        to: String,
        #[source]
        source: io::Error,
    },

    #[error("Pipeline failed at stage '{stage}'")]
    PipelineFailed { stage: String },

    #[error("Failed to write run report: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
