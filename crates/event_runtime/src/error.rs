// Execution errors

use event_types::InstructionKind;

use crate::scene::SceneId;

/// Errors that can occur while running events
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("Unknown {kind}: {operation}")]
    UnknownInstruction {
        operation: String,
        kind: InstructionKind,
    },

    #[error("{operation} is registered as {registered}, used as {used}")]
    KindMismatch {
        operation: String,
        registered: InstructionKind,
        used: InstructionKind,
    },

    #[error("{operation} expects {min}..={max} parameters, got {found}")]
    ArityMismatch {
        operation: String,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("{operation} failed: {message}")]
    InstructionFailed { operation: String, message: String },

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Function call depth exceeded ({0})")]
    CallDepthExceeded(usize),

    #[error("Scene not running: {0}")]
    SceneNotFound(SceneId),
}

/// Result type for execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;
