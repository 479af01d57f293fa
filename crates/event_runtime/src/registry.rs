// Instruction Registry - Stores instruction definitions and their executors
//
// The registry holds every condition and action an event can reference. Each
// one has a definition (kind, category, declared parameters) and an executor.
// Parameter counts are checked here, never by the instructions themselves.

use std::collections::HashMap;
use std::sync::Arc;

use event_types::{EventTree, Instruction, InstructionKind, search_for_function_in_events};

use crate::builtins::CALL_FUNCTION;
use crate::error::{ExecutionError, ExecutionResult};
use crate::executor::{InstructionContext, InstructionOutput, resolve_parameter};

// ─────────────────────────────────────────────────────────────────────────────
// Instruction Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// A declared instruction parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDef {
    pub name: String,
    /// Optional parameters may be left out at the end of the list
    pub optional: bool,
}

/// Definition of a condition or action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDef {
    /// Operation identifier (e.g., "variables/Set")
    pub id: String,
    pub kind: InstructionKind,
    /// Display name
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub parameters: Vec<ParameterDef>,
}

impl InstructionDef {
    /// Define a condition
    pub fn condition(id: &str, name: &str, category: &str) -> Self {
        Self::new(id, InstructionKind::Condition, name, category)
    }

    /// Define an action
    pub fn action(id: &str, name: &str, category: &str) -> Self {
        Self::new(id, InstructionKind::Action, name, category)
    }

    fn new(id: &str, kind: InstructionKind, name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Declare a required parameter
    pub fn with_parameter(mut self, name: &str) -> Self {
        self.parameters.push(ParameterDef {
            name: name.to_string(),
            optional: false,
        });
        self
    }

    /// Declare an optional parameter
    pub fn with_optional_parameter(mut self, name: &str) -> Self {
        self.parameters.push(ParameterDef {
            name: name.to_string(),
            optional: true,
        });
        self
    }

    /// Accepted parameter count range (inclusive)
    pub fn arity(&self) -> (usize, usize) {
        let required = self.parameters.iter().filter(|p| !p.optional).count();
        (required, self.parameters.len())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instruction Executor Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for instruction execution
pub trait InstructionExecutor: Send + Sync {
    /// Execute the instruction with the given context
    fn execute(&self, ctx: &mut InstructionContext<'_>) -> InstructionOutput;
}

/// Function-based instruction executor
pub struct FnInstructionExecutor<F>
where
    F: Fn(&mut InstructionContext<'_>) -> InstructionOutput + Send + Sync,
{
    func: F,
}

impl<F> FnInstructionExecutor<F>
where
    F: Fn(&mut InstructionContext<'_>) -> InstructionOutput + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> InstructionExecutor for FnInstructionExecutor<F>
where
    F: Fn(&mut InstructionContext<'_>) -> InstructionOutput + Send + Sync,
{
    fn execute(&self, ctx: &mut InstructionContext<'_>) -> InstructionOutput {
        (self.func)(ctx)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instruction Registry
// ─────────────────────────────────────────────────────────────────────────────

struct InstructionEntry {
    definition: InstructionDef,
    executor: Arc<dyn InstructionExecutor>,
}

/// Registry of every available condition and action
pub struct InstructionRegistry {
    instructions: HashMap<String, InstructionEntry>,
}

impl Default for InstructionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            instructions: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in instructions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtin_instructions(&mut registry);
        registry
    }

    /// Register an instruction with its executor, replacing any previous
    /// registration of the same id
    pub fn register(&mut self, definition: InstructionDef, executor: Arc<dyn InstructionExecutor>) {
        let id = definition.id.clone();
        self.instructions.insert(id, InstructionEntry {
            definition,
            executor,
        });
    }

    /// Register an instruction with a function executor
    pub fn register_fn<F>(&mut self, definition: InstructionDef, func: F)
    where
        F: Fn(&mut InstructionContext<'_>) -> InstructionOutput + Send + Sync + 'static,
    {
        self.register(definition, Arc::new(FnInstructionExecutor::new(func)));
    }

    /// Get an instruction definition by id
    pub fn get_definition(&self, id: &str) -> Option<&InstructionDef> {
        self.instructions.get(id).map(|e| &e.definition)
    }

    /// Get an instruction executor by id
    pub fn get_executor(&self, id: &str) -> Option<Arc<dyn InstructionExecutor>> {
        self.instructions.get(id).map(|e| Arc::clone(&e.executor))
    }

    /// Get all instruction definitions
    pub fn definitions(&self) -> impl Iterator<Item = &InstructionDef> {
        self.instructions.values().map(|e| &e.definition)
    }

    /// Get all categories
    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<_> = self
            .instructions
            .values()
            .map(|e| e.definition.category.clone())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instructions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Check that `instruction` is registered as `kind` and carries an
    /// accepted number of parameters
    pub fn validate(
        &self,
        instruction: &Instruction,
        kind: InstructionKind,
    ) -> ExecutionResult<&InstructionDef> {
        let definition = self.get_definition(&instruction.operation).ok_or_else(|| {
            ExecutionError::UnknownInstruction {
                operation: instruction.operation.clone(),
                kind,
            }
        })?;

        if definition.kind != kind {
            return Err(ExecutionError::KindMismatch {
                operation: instruction.operation.clone(),
                registered: definition.kind,
                used: kind,
            });
        }

        let (min, max) = definition.arity();
        let found = instruction.parameter_count();
        if found < min || found > max {
            return Err(ExecutionError::ArityMismatch {
                operation: instruction.operation.clone(),
                min,
                max,
                found,
            });
        }

        Ok(definition)
    }

    /// Validate every instruction of a tree, sub-events and function bodies
    /// included. Function calls must name a function of the tree. Returns
    /// every problem found, in tree order.
    pub fn validate_events(&self, events: &EventTree) -> Vec<ExecutionError> {
        let mut errors = Vec::new();
        events.walk(&mut |event, _| {
            for (kind, instructions) in event.instruction_lists() {
                for instruction in instructions {
                    if let Err(error) = self.validate(instruction, kind) {
                        errors.push(error);
                        continue;
                    }
                    if instruction.operation == CALL_FUNCTION {
                        if let Some(name) = called_function(instruction) {
                            if search_for_function_in_events(events, &name).is_none() {
                                errors.push(ExecutionError::FunctionNotFound(name));
                            }
                        }
                    }
                }
            }
        });
        errors
    }
}

fn called_function(instruction: &Instruction) -> Option<String> {
    let expression = instruction.parameter(0)?;
    match resolve_parameter(expression) {
        serde_json::Value::String(name) => Some(name),
        _ => Some(expression.to_string()),
    }
}
