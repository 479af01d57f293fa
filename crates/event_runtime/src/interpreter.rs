// Events Executor - Runs an event tree against a scene
//
// Walks the tree in sibling order. Standard events copy their parent's object
// lists, narrow them with their conditions, then run their actions and
// sub-events. Groups are transparent, functions only run when called, and
// comments never run.

use std::sync::Arc;

use tracing::{debug, warn};

use event_types::{
    EventNode, EventTree, FunctionEvent, Instruction, InstructionKind,
    search_for_function_in_events,
};

use crate::error::{ExecutionError, ExecutionResult};
use crate::executor::{InstructionContext, InstructionOutput};
use crate::object_lists::ObjectLists;
use crate::registry::InstructionRegistry;
use crate::scene::RuntimeScene;

/// Maximum nesting of function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Where execution currently is: the tree functions are looked up in and the
/// current function call nesting
#[derive(Clone, Copy)]
struct Frame<'t> {
    root: &'t EventTree,
    depth: usize,
}

/// Executes event trees
pub struct EventsExecutor {
    registry: Arc<InstructionRegistry>,
    max_call_depth: usize,
}

impl EventsExecutor {
    pub fn new(registry: Arc<InstructionRegistry>) -> Self {
        Self {
            registry,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn registry(&self) -> &InstructionRegistry {
        &self.registry
    }

    /// Run every event of `events` once against `scene`. Each top-level
    /// event starts from empty object lists.
    pub fn run(&self, events: &EventTree, scene: &mut RuntimeScene) -> ExecutionResult<()> {
        let frame = Frame {
            root: events,
            depth: 0,
        };
        self.run_events(events, scene, &ObjectLists::new(), frame)
    }

    /// Run a function event of `events` by name, as the call action would
    pub fn call_function(
        &self,
        events: &EventTree,
        scene: &mut RuntimeScene,
        name: &str,
    ) -> ExecutionResult<()> {
        let frame = Frame {
            root: events,
            depth: 0,
        };
        self.call(name, None, scene, &mut ObjectLists::new(), frame)
    }

    fn run_events(
        &self,
        events: &EventTree,
        scene: &mut RuntimeScene,
        parent: &ObjectLists,
        frame: Frame<'_>,
    ) -> ExecutionResult<()> {
        for event in events {
            if event.is_disabled() {
                continue;
            }
            match event {
                EventNode::Standard(standard) => {
                    let mut lists = parent.clone();
                    self.run_body(
                        &standard.conditions,
                        &standard.actions,
                        &standard.events,
                        scene,
                        &mut lists,
                        frame,
                    )?;
                }
                EventNode::Group(group) => {
                    self.run_events(&group.events, scene, parent, frame)?;
                }
                EventNode::Function(_) | EventNode::Comment(_) => {}
            }
        }
        Ok(())
    }

    /// Conditions, then actions and sub-events if they all passed
    fn run_body(
        &self,
        conditions: &[Instruction],
        actions: &[Instruction],
        sub_events: &EventTree,
        scene: &mut RuntimeScene,
        lists: &mut ObjectLists,
        frame: Frame<'_>,
    ) -> ExecutionResult<()> {
        if !self.conditions_pass(conditions, scene, lists)? {
            return Ok(());
        }
        for action in actions {
            self.run_action(action, scene, lists, frame)?;
        }
        self.run_events(sub_events, scene, lists, frame)
    }

    fn conditions_pass(
        &self,
        conditions: &[Instruction],
        scene: &mut RuntimeScene,
        lists: &mut ObjectLists,
    ) -> ExecutionResult<bool> {
        for condition in conditions {
            let output = self.execute(condition, InstructionKind::Condition, scene, lists)?;
            let Some(truth) = output.truth() else {
                return Err(ExecutionError::InstructionFailed {
                    operation: condition.operation.clone(),
                    message: "condition produced no result".to_string(),
                });
            };
            if truth == condition.inverted {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn run_action(
        &self,
        action: &Instruction,
        scene: &mut RuntimeScene,
        lists: &mut ObjectLists,
        frame: Frame<'_>,
    ) -> ExecutionResult<()> {
        match self.execute(action, InstructionKind::Action, scene, lists)? {
            InstructionOutput::CallFunction { name, objects } => {
                self.call(&name, objects.as_deref(), scene, lists, frame)
            }
            _ => Ok(()),
        }
    }

    fn execute(
        &self,
        instruction: &Instruction,
        kind: InstructionKind,
        scene: &mut RuntimeScene,
        lists: &mut ObjectLists,
    ) -> ExecutionResult<InstructionOutput> {
        self.registry.validate(instruction, kind)?;
        let executor = self
            .registry
            .get_executor(&instruction.operation)
            .ok_or_else(|| ExecutionError::UnknownInstruction {
                operation: instruction.operation.clone(),
                kind,
            })?;

        let mut ctx = InstructionContext::new(instruction, scene, lists);
        match executor.execute(&mut ctx) {
            InstructionOutput::Error(message) => {
                warn!(operation = %instruction.operation, %message, "Instruction failed");
                Err(ExecutionError::InstructionFailed {
                    operation: instruction.operation.clone(),
                    message,
                })
            }
            output => Ok(output),
        }
    }

    /// Run a function event. The function gets its own object lists: the
    /// caller's `objects` list, if any, is bound under the function's
    /// argument name. The caller's picking is left as it was.
    fn call(
        &self,
        name: &str,
        objects: Option<&str>,
        scene: &mut RuntimeScene,
        caller: &mut ObjectLists,
        frame: Frame<'_>,
    ) -> ExecutionResult<()> {
        if frame.depth >= self.max_call_depth {
            return Err(ExecutionError::CallDepthExceeded(self.max_call_depth));
        }
        let function = search_for_function_in_events(frame.root, name)
            .ok_or_else(|| ExecutionError::FunctionNotFound(name.to_string()))?;
        if function.disabled {
            debug!(function = %name, "Skipping disabled function");
            return Ok(());
        }

        let mut lists = Self::bind_arguments(function, objects, scene, caller);
        debug!(function = %name, depth = frame.depth + 1, "Calling function");
        let inner = Frame {
            root: frame.root,
            depth: frame.depth + 1,
        };
        self.run_body(
            &function.conditions,
            &function.actions,
            &function.events,
            scene,
            &mut lists,
            inner,
        )
    }

    fn bind_arguments(
        function: &FunctionEvent,
        objects: Option<&str>,
        scene: &RuntimeScene,
        caller: &mut ObjectLists,
    ) -> ObjectLists {
        let mut lists = ObjectLists::new();
        let Some(objects) = objects else {
            return lists;
        };
        if function.objects_passed_as_argument.is_empty() {
            return lists;
        }
        let mut passed = caller.ensure(objects, &scene.objects).clone();
        passed.retain(|handle| scene.objects.is_alive(*handle));
        lists.insert(function.objects_passed_as_argument.clone(), passed);
        lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_types::{CommentEvent, GroupEvent, StandardEvent};
    use serde_json::Value;

    fn executor() -> EventsExecutor {
        EventsExecutor::new(Arc::new(InstructionRegistry::with_builtins()))
    }

    fn set(name: &str, value: &str) -> Instruction {
        Instruction::with_parameters("variables/Set", [name, value])
    }

    fn is_true() -> Instruction {
        Instruction::new("common/IsTrue")
    }

    #[test]
    fn test_conditions_gate_actions_and_sub_events() {
        let mut events = EventTree::new();
        events.push(
            StandardEvent::new()
                .with_condition(is_true())
                .with_condition(is_true().inverted())
                .with_action(set("a", "1"))
                .with_sub_event(StandardEvent::new().with_action(set("b", "1"))),
        );
        events.push(StandardEvent::new().with_action(set("c", "1")));

        let mut scene = RuntimeScene::new("s");
        executor().run(&events, &mut scene).unwrap();
        assert_eq!(scene.variable("a"), None);
        assert_eq!(scene.variable("b"), None);
        assert_eq!(scene.variable("c"), Some(&Value::from(1)));
    }

    #[test]
    fn test_disabled_and_skipped_nodes() {
        let mut disabled = StandardEvent::new().with_action(set("a", "1"));
        disabled.disabled = true;

        let mut events = EventTree::new();
        events.push(disabled);
        events.push(CommentEvent::new("note"));
        events.push(FunctionEvent::new("F", "").with_action(set("f", "1")));

        let mut scene = RuntimeScene::new("s");
        executor().run(&events, &mut scene).unwrap();
        assert!(scene.variables.is_empty());
    }

    #[test]
    fn test_sub_events_inherit_picking() {
        let mut scene = RuntimeScene::new("s");
        let a = scene.create_object("Enemy");
        scene.objects.get_mut(a).unwrap().set_variable("hp", Value::from(0));
        scene.create_object("Enemy");

        let mut events = EventTree::new();
        events.push(
            StandardEvent::new()
                .with_condition(Instruction::with_parameters(
                    "objects/VarEquals",
                    ["Enemy", "hp", "0"],
                ))
                .with_sub_event(
                    StandardEvent::new()
                        .with_action(Instruction::with_parameters("objects/Delete", ["Enemy"])),
                ),
        );

        executor().run(&events, &mut scene).unwrap();
        assert_eq!(scene.objects.len(), 1);
        assert!(!scene.objects.is_alive(a));
    }

    #[test]
    fn test_sibling_picking_is_independent() {
        let mut scene = RuntimeScene::new("s");
        let a = scene.create_object("Enemy");
        scene.objects.get_mut(a).unwrap().set_variable("hp", Value::from(0));
        scene.create_object("Enemy");

        let mut events = EventTree::new();
        events.push(
            GroupEvent::new("g").with_sub_event(StandardEvent::new().with_condition(
                Instruction::with_parameters("objects/VarEquals", ["Enemy", "hp", "0"]),
            )),
        );
        events.push(
            StandardEvent::new().with_action(Instruction::with_parameters(
                "objects/SetVar",
                ["Enemy", "seen", "true"],
            )),
        );

        executor().run(&events, &mut scene).unwrap();
        let seen = scene
            .objects
            .iter()
            .filter(|(_, instance)| instance.variable("seen").is_some())
            .count();
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_unknown_instruction_fails() {
        let mut events = EventTree::new();
        events.push(StandardEvent::new().with_action(Instruction::new("nope/Nope")));

        let mut scene = RuntimeScene::new("s");
        let result = executor().run(&events, &mut scene);
        assert!(matches!(result, Err(ExecutionError::UnknownInstruction { .. })));
    }

    #[test]
    fn test_function_not_found() {
        let mut events = EventTree::new();
        events.push(
            StandardEvent::new()
                .with_action(Instruction::with_parameters("functions/Call", ["Missing"])),
        );

        let mut scene = RuntimeScene::new("s");
        assert_eq!(
            executor().run(&events, &mut scene),
            Err(ExecutionError::FunctionNotFound("Missing".to_string()))
        );
    }

    #[test]
    fn test_recursion_is_bounded() {
        let mut events = EventTree::new();
        events.push(
            FunctionEvent::new("Loop", "")
                .with_action(Instruction::with_parameters("functions/Call", ["Loop"])),
        );

        let mut scene = RuntimeScene::new("s");
        let result = executor()
            .with_max_call_depth(8)
            .call_function(&events, &mut scene, "Loop");
        assert_eq!(result, Err(ExecutionError::CallDepthExceeded(8)));
    }

    #[test]
    fn test_disabled_function_call_is_noop() {
        let mut function = FunctionEvent::new("F", "").with_action(set("f", "1"));
        function.disabled = true;

        let mut events = EventTree::new();
        events.push(function);
        events.push(
            StandardEvent::new().with_action(Instruction::with_parameters("functions/Call", ["F"])),
        );

        let mut scene = RuntimeScene::new("s");
        executor().run(&events, &mut scene).unwrap();
        assert_eq!(scene.variable("f"), None);
    }
}
