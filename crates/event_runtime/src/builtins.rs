// Built-in Instructions
//
// Conditions and actions available to every event sheet. Picking conditions
// narrow the object lists of the current event as a side effect and report
// whether anything is left; the events executor applies inversion afterwards.

use serde_json::Value;
use tracing::info;

use crate::executor::InstructionOutput;
use crate::linked_objects;
use crate::registry::{InstructionDef, InstructionRegistry};

/// Action asking the events executor to run a function event
pub const CALL_FUNCTION: &str = "functions/Call";

/// Register all built-in instructions
pub fn register_builtin_instructions(registry: &mut InstructionRegistry) {
    register_common(registry);
    register_variables(registry);
    register_objects(registry);
    register_linked_objects(registry);
    register_functions(registry);

    info!(count = registry.len(), "Registered built-in instructions");
}

/// Compare two values with an operator. Numbers compare numerically; other
/// values only support equality. `None` for an unknown operator.
pub fn compare_values(a: &Value, operator: &str, b: &Value) -> Option<bool> {
    if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
        return match operator {
            "==" | "=" => Some(a == b),
            "!=" => Some(a != b),
            "<" => Some(a < b),
            "<=" => Some(a <= b),
            ">" => Some(a > b),
            ">=" => Some(a >= b),
            _ => None,
        };
    }
    match operator {
        "==" | "=" => Some(a == b),
        "!=" => Some(a != b),
        "<" | "<=" | ">" | ">=" => Some(false),
        _ => None,
    }
}

/// Read a required name parameter or bail out with an error output
macro_rules! name_param {
    ($ctx:expr, $index:expr, $what:literal) => {
        match $ctx.parameter_name($index) {
            Some(name) => name,
            None => return InstructionOutput::error(concat!("missing ", $what)),
        }
    };
}

fn register_common(registry: &mut InstructionRegistry) {
    let def = InstructionDef::condition("common/IsTrue", "Always", "Common")
        .with_description("Always true");

    registry.register_fn(def, |_ctx| InstructionOutput::condition(true));
}

fn register_variables(registry: &mut InstructionRegistry) {
    let def = InstructionDef::condition("variables/Compare", "Compare variable", "Variables")
        .with_description("Compare a scene variable with a value")
        .with_parameter("name")
        .with_parameter("operator")
        .with_parameter("value");

    registry.register_fn(def, |ctx| {
        let name = name_param!(ctx, 0, "variable name");
        let operator = name_param!(ctx, 1, "operator");
        let value = ctx.parameter_value(2).unwrap_or(Value::Null);
        let Some(current) = ctx.scene.variable(&name) else {
            return InstructionOutput::condition(false);
        };
        match compare_values(current, &operator, &value) {
            Some(result) => InstructionOutput::condition(result),
            None => InstructionOutput::error(format!("unknown operator {operator}")),
        }
    });

    let def = InstructionDef::condition("variables/Exists", "Variable exists", "Variables")
        .with_description("Check that a scene variable is set")
        .with_parameter("name");

    registry.register_fn(def, |ctx| {
        let name = name_param!(ctx, 0, "variable name");
        InstructionOutput::condition(ctx.scene.variable(&name).is_some())
    });

    let def = InstructionDef::action("variables/Set", "Set variable", "Variables")
        .with_description("Set a scene variable")
        .with_parameter("name")
        .with_parameter("value");

    registry.register_fn(def, |ctx| {
        let name = name_param!(ctx, 0, "variable name");
        let value = ctx.parameter_value(1).unwrap_or(Value::Null);
        ctx.scene.set_variable(name, value);
        InstructionOutput::Done
    });
}

fn register_objects(registry: &mut InstructionRegistry) {
    let def = InstructionDef::condition("objects/VarEquals", "Object variable", "Objects")
        .with_description("Pick the objects whose variable equals a value")
        .with_parameter("object")
        .with_parameter("variable")
        .with_parameter("value");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let variable = name_param!(ctx, 1, "variable name");
        let value = ctx.parameter_value(2).unwrap_or(Value::Null);

        let store = &ctx.scene.objects;
        let picked = ctx.objects.ensure(&object, store);
        picked.retain(|handle| {
            store
                .get(*handle)
                .and_then(|instance| instance.variable(&variable))
                .and_then(|current| compare_values(current, "==", &value))
                .unwrap_or(false)
        });
        InstructionOutput::condition(!picked.is_empty())
    });

    let def = InstructionDef::condition("objects/Count", "Number of objects", "Objects")
        .with_description("Compare the number of picked objects with a value")
        .with_parameter("object")
        .with_parameter("operator")
        .with_parameter("value");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let operator = name_param!(ctx, 1, "operator");
        let value = ctx.parameter_value(2).unwrap_or(Value::Null);
        let count = Value::from(ctx.picked(&object).len());
        match compare_values(&count, &operator, &value) {
            Some(result) => InstructionOutput::condition(result),
            None => InstructionOutput::error(format!("unknown operator {operator}")),
        }
    });

    let def = InstructionDef::action("objects/Create", "Create object", "Objects")
        .with_description("Create an instance and pick it")
        .with_parameter("object");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let handle = ctx.scene.create_object(object.clone());
        ctx.objects.add_created(&object, handle);
        InstructionOutput::Done
    });

    let def = InstructionDef::action("objects/Delete", "Delete objects", "Objects")
        .with_description("Delete every picked instance")
        .with_parameter("object");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        for handle in ctx.picked(&object) {
            ctx.scene.delete_object(handle);
        }
        ctx.objects.retain_live(&ctx.scene.objects);
        InstructionOutput::Done
    });

    let def = InstructionDef::action("objects/SetVar", "Set object variable", "Objects")
        .with_description("Set a variable of every picked instance")
        .with_parameter("object")
        .with_parameter("variable")
        .with_parameter("value");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let variable = name_param!(ctx, 1, "variable name");
        let value = ctx.parameter_value(2).unwrap_or(Value::Null);
        for handle in ctx.picked(&object) {
            if let Some(instance) = ctx.scene.objects.get_mut(handle) {
                instance.set_variable(variable.clone(), value.clone());
            }
        }
        InstructionOutput::Done
    });
}

fn register_linked_objects(registry: &mut InstructionRegistry) {
    let def = InstructionDef::condition("linked/PickObjectsLinkedTo", "Linked objects", "Linked objects")
        .with_description("Pick the objects linked to the first picked instance of another object")
        .with_parameter("object to pick")
        .with_parameter("linked to");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let target = name_param!(ctx, 1, "linked object");
        let linked_to = ctx.first_picked(&target);

        ctx.picked(&object);
        let mut picked = ctx.objects.split_off(&[object.as_str()]);
        let result = linked_objects::pick_objects_linked_to(ctx.scene, &mut picked, linked_to);
        ctx.objects.merge(picked);
        InstructionOutput::condition(result)
    });

    let def = InstructionDef::action("linked/LinkObjects", "Link objects", "Linked objects")
        .with_description("Link every picked instance to the first picked instance of another object")
        .with_parameter("object")
        .with_parameter("link to");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let other = name_param!(ctx, 1, "linked object");
        let target = ctx.first_picked(&other);
        for handle in ctx.picked(&object) {
            linked_objects::link_objects(ctx.scene, Some(handle), target);
        }
        InstructionOutput::Done
    });

    let def = InstructionDef::action("linked/RemoveLinkBetween", "Unlink objects", "Linked objects")
        .with_description("Remove the links between picked instances and the first picked instance of another object")
        .with_parameter("object")
        .with_parameter("unlink from");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        let other = name_param!(ctx, 1, "linked object");
        let target = ctx.first_picked(&other);
        for handle in ctx.picked(&object) {
            linked_objects::remove_link_between(ctx.scene, Some(handle), target);
        }
        InstructionOutput::Done
    });

    let def = InstructionDef::action("linked/RemoveAllLinksOf", "Unlink all", "Linked objects")
        .with_description("Remove every link of the picked instances")
        .with_parameter("object");

    registry.register_fn(def, |ctx| {
        let object = name_param!(ctx, 0, "object");
        for handle in ctx.picked(&object) {
            linked_objects::remove_all_links_of(ctx.scene, Some(handle));
        }
        InstructionOutput::Done
    });
}

fn register_functions(registry: &mut InstructionRegistry) {
    let def = InstructionDef::action(CALL_FUNCTION, "Call function", "Functions")
        .with_description("Run a function event, passing it the picked instances of an object")
        .with_parameter("function")
        .with_optional_parameter("objects");

    registry.register_fn(def, |ctx| {
        let name = name_param!(ctx, 0, "function name");
        let objects = ctx.parameter_name(1).filter(|objects| !objects.is_empty());
        InstructionOutput::CallFunction { name, objects }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InstructionContext;
    use crate::object_lists::ObjectLists;
    use crate::scene::RuntimeScene;
    use event_types::Instruction;

    fn run(
        registry: &InstructionRegistry,
        instruction: &Instruction,
        scene: &mut RuntimeScene,
        objects: &mut ObjectLists,
    ) -> InstructionOutput {
        let executor = registry.get_executor(&instruction.operation).unwrap();
        let mut ctx = InstructionContext::new(instruction, scene, objects);
        executor.execute(&mut ctx)
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&Value::from(1), "==", &Value::from(1.0)), Some(true));
        assert_eq!(compare_values(&Value::from(2), ">=", &Value::from(3)), Some(false));
        assert_eq!(compare_values(&Value::from("a"), "!=", &Value::from("b")), Some(true));
        assert_eq!(compare_values(&Value::from("a"), "<", &Value::from("b")), Some(false));
        assert_eq!(compare_values(&Value::from(1), "~", &Value::from(1)), None);
    }

    #[test]
    fn test_builtins_registered() {
        let registry = InstructionRegistry::with_builtins();
        assert_eq!(registry.len(), 14);
        assert!(registry.contains(CALL_FUNCTION));
        assert!(registry.categories().contains(&"Linked objects".to_string()));
    }

    #[test]
    fn test_variables() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        let mut objects = ObjectLists::new();

        let set = Instruction::with_parameters("variables/Set", ["x", "1"]);
        assert_eq!(run(&registry, &set, &mut scene, &mut objects), InstructionOutput::Done);
        assert_eq!(scene.variable("x"), Some(&Value::from(1)));

        let compare = Instruction::with_parameters("variables/Compare", ["x", "<", "2"]);
        assert_eq!(
            run(&registry, &compare, &mut scene, &mut objects),
            InstructionOutput::condition(true)
        );

        let missing = Instruction::with_parameters("variables/Exists", ["y"]);
        assert_eq!(
            run(&registry, &missing, &mut scene, &mut objects),
            InstructionOutput::condition(false)
        );

        let bad = Instruction::with_parameters("variables/Compare", ["x", "~", "2"]);
        assert!(run(&registry, &bad, &mut scene, &mut objects).is_error());
    }

    #[test]
    fn test_var_equals_picks() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        let a = scene.create_object("Enemy");
        let b = scene.create_object("Enemy");
        scene.objects.get_mut(b).unwrap().set_variable("hp", Value::from(0));
        let mut objects = ObjectLists::new();

        let dead = Instruction::with_parameters("objects/VarEquals", ["Enemy", "hp", "0"]);
        assert_eq!(
            run(&registry, &dead, &mut scene, &mut objects),
            InstructionOutput::condition(true)
        );
        assert_eq!(objects.get("Enemy"), Some(&[b][..]));

        let delete = Instruction::with_parameters("objects/Delete", ["Enemy"]);
        run(&registry, &delete, &mut scene, &mut objects);
        assert!(scene.objects.is_alive(a));
        assert!(!scene.objects.is_alive(b));
        assert_eq!(objects.get("Enemy"), Some(&[][..]));
    }

    #[test]
    fn test_create_picks_only_new_instance() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        scene.create_object("Bullet");
        let mut objects = ObjectLists::new();

        let create = Instruction::with_parameters("objects/Create", ["Bullet"]);
        run(&registry, &create, &mut scene, &mut objects);
        let set = Instruction::with_parameters("objects/SetVar", ["Bullet", "fresh", "true"]);
        run(&registry, &set, &mut scene, &mut objects);

        let fresh: Vec<_> = scene
            .objects
            .iter()
            .filter(|(_, instance)| instance.variable("fresh").is_some())
            .collect();
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_count() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        scene.create_object("Coin");
        scene.create_object("Coin");
        let mut objects = ObjectLists::new();

        let count = Instruction::with_parameters("objects/Count", ["Coin", "==", "2"]);
        assert_eq!(
            run(&registry, &count, &mut scene, &mut objects),
            InstructionOutput::condition(true)
        );
    }

    #[test]
    fn test_link_actions() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        let tank = scene.create_object("Tank");
        let turret = scene.create_object("Turret");
        let other = scene.create_object("Turret");
        let mut objects = ObjectLists::new();

        let link = Instruction::with_parameters("linked/LinkObjects", ["Turret", "Tank"]);
        run(&registry, &link, &mut scene, &mut objects);
        assert_eq!(scene.objects_linked_with(tank), vec![turret, other]);

        let unlink = Instruction::with_parameters("linked/RemoveLinkBetween", ["Tank", "Turret"]);
        run(&registry, &unlink, &mut scene, &mut objects);
        assert_eq!(scene.objects_linked_with(tank), vec![other]);

        let clear = Instruction::with_parameters("linked/RemoveAllLinksOf", ["Tank"]);
        run(&registry, &clear, &mut scene, &mut objects);
        assert!(scene.links.is_empty());
    }

    #[test]
    fn test_pick_linked_narrows_named_list_only() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        let tank = scene.create_object("Tank");
        let turret = scene.create_object("Turret");
        scene.create_object("Turret");
        let coin = scene.create_object("Coin");
        scene.links.link_objects(tank, turret);

        let mut objects = ObjectLists::new();
        objects.ensure("Coin", &scene.objects);

        let pick = Instruction::with_parameters("linked/PickObjectsLinkedTo", ["Turret", "Tank"]);
        assert_eq!(
            run(&registry, &pick, &mut scene, &mut objects),
            InstructionOutput::condition(true)
        );
        assert_eq!(objects.get("Turret"), Some(&[turret][..]));
        assert_eq!(objects.get("Coin"), Some(&[coin][..]));
    }

    #[test]
    fn test_call_function_output() {
        let registry = InstructionRegistry::with_builtins();
        let mut scene = RuntimeScene::new("s");
        let mut objects = ObjectLists::new();

        let call = Instruction::with_parameters(CALL_FUNCTION, ["\"Spawn\"", "Enemy"]);
        assert_eq!(
            run(&registry, &call, &mut scene, &mut objects),
            InstructionOutput::CallFunction {
                name: "Spawn".to_string(),
                objects: Some("Enemy".to_string()),
            }
        );

        let call = Instruction::with_parameters(CALL_FUNCTION, ["Spawn"]);
        assert_eq!(
            run(&registry, &call, &mut scene, &mut objects),
            InstructionOutput::CallFunction {
                name: "Spawn".to_string(),
                objects: None,
            }
        );
    }
}
