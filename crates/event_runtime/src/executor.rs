// Executor - Instruction execution context and output types
//
// Provides the context passed to instruction executors and the output they
// hand back to the events executor.

use serde_json::Value;

use event_types::Instruction;

use crate::object_lists::ObjectLists;
use crate::objects::ObjectHandle;
use crate::scene::RuntimeScene;

/// Resolve a parameter expression: JSON literals (numbers, booleans, null,
/// quoted strings, arrays, objects) parse to their value, anything else is
/// taken as a raw string.
pub fn resolve_parameter(expression: &str) -> Value {
    serde_json::from_str(expression.trim())
        .unwrap_or_else(|_| Value::String(expression.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Instruction Context
// ─────────────────────────────────────────────────────────────────────────────

/// Context passed to instruction executors
pub struct InstructionContext<'a> {
    /// The instruction being executed
    pub instruction: &'a Instruction,
    /// The running scene (objects, links, variables)
    pub scene: &'a mut RuntimeScene,
    /// Picking context of the current event
    pub objects: &'a mut ObjectLists,
}

impl<'a> InstructionContext<'a> {
    pub fn new(
        instruction: &'a Instruction,
        scene: &'a mut RuntimeScene,
        objects: &'a mut ObjectLists,
    ) -> Self {
        Self {
            instruction,
            scene,
            objects,
        }
    }

    /// Operation identifier of the instruction
    pub fn operation(&self) -> &str {
        &self.instruction.operation
    }

    /// Raw parameter expression
    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.instruction.parameter(index)
    }

    /// Parameter as a name: quoted strings are unquoted, other expressions
    /// are kept verbatim
    pub fn parameter_name(&self, index: usize) -> Option<String> {
        match resolve_parameter(self.parameter(index)?) {
            Value::String(name) => Some(name),
            _ => self.parameter(index).map(str::to_string),
        }
    }

    /// Resolved parameter value
    pub fn parameter_value(&self, index: usize) -> Option<Value> {
        self.parameter(index).map(resolve_parameter)
    }

    /// Picked objects of the named list, filling it first if needed.
    /// Destroyed instances are dropped from the list.
    pub fn picked(&mut self, name: &str) -> Vec<ObjectHandle> {
        let store = &self.scene.objects;
        let list = self.objects.ensure(name, store);
        list.retain(|handle| store.is_alive(*handle));
        list.clone()
    }

    /// First picked object of the named list
    pub fn first_picked(&mut self, name: &str) -> Option<ObjectHandle> {
        self.picked(name).first().copied()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instruction Output
// ─────────────────────────────────────────────────────────────────────────────

/// Output from an instruction execution
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionOutput {
    /// Raw result of a condition, before inversion
    Condition(bool),
    /// Action completed
    Done,
    /// Action asks the events executor to run a function event
    CallFunction {
        name: String,
        /// Caller list bound to the function's object argument
        objects: Option<String>,
    },
    /// Execution failed
    Error(String),
}

impl InstructionOutput {
    /// Create a condition result
    pub fn condition(result: bool) -> Self {
        Self::Condition(result)
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Check if this output is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Get the error message if this is an error
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Condition result, if this is one
    pub fn truth(&self) -> Option<bool> {
        match self {
            Self::Condition(result) => Some(*result),
            _ => None,
        }
    }
}
