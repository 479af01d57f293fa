// Function Events - Lookup and stable symbol names
//
// Actions reference function events by name. Lookup walks the tree
// depth-first and the first match wins; duplicate names are allowed.

use crate::event::{EventNode, FunctionEvent};
use crate::tree::EventTree;

/// Prefix of every mangled function symbol
pub const FUNCTION_SYMBOL_PREFIX: &str = "evfn";

/// Separator between mangled segments. Mangled segments never contain it.
const SEGMENT_SEPARATOR: &str = "__";

/// Mangle an arbitrary name into `[A-Za-z0-9_]`.
///
/// ASCII alphanumerics are kept, any other character becomes `_` followed by
/// its code point as six lowercase hex digits. A mangled name therefore never
/// contains `__` and never ends with `_`, which keeps concatenations
/// unambiguous.
pub fn mangle_name(name: &str) -> String {
    let mut mangled = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            mangled.push(c);
        } else {
            mangled.push_str(&format!("_{:06x}", u32::from(c)));
        }
    }
    mangled
}

/// Derive a unique, stable symbol for a function event declared in `scope`
/// (usually the name of the scene owning the events)
pub fn mangle_function_name(scope: &str, function: &FunctionEvent) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        FUNCTION_SYMBOL_PREFIX,
        mangle_name(scope),
        mangle_name(&function.name),
        sep = SEGMENT_SEPARATOR
    )
}

/// Search `events` (recursively) for a function event named `name`.
///
/// Nodes are visited depth-first in sibling order, descending into the
/// sub-events of every kind of node. Returns the first match.
pub fn search_for_function_in_events<'a>(
    events: &'a EventTree,
    name: &str,
) -> Option<&'a FunctionEvent> {
    for event in events {
        if let EventNode::Function(function) = event {
            if function.name == name {
                return Some(function);
            }
        }
        if event.can_have_sub_events() {
            if let Some(found) = search_for_function_in_events(event.sub_events(), name) {
                return Some(found);
            }
        }
    }
    None
}

/// All function events of a tree, in lookup order
pub fn functions_in_events(events: &EventTree) -> Vec<&FunctionEvent> {
    let mut functions = Vec::new();
    events.walk(&mut |event, _| {
        if let EventNode::Function(function) = event {
            functions.push(function);
        }
    });
    functions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GroupEvent, StandardEvent};
    use crate::instruction::Instruction;

    fn marked(name: &str, marker: &str) -> FunctionEvent {
        FunctionEvent::new(name, "").with_action(Instruction::new(marker))
    }

    #[test]
    fn test_mangle_name() {
        assert_eq!(mangle_name("Level1"), "Level1");
        assert_eq!(mangle_name("My scene"), "My_000020scene");
        assert_eq!(mangle_name("a_b"), "a_00005fb");
        assert_eq!(mangle_name("é"), "_0000e9");
        // Fixed-width escapes keep "Level 1" and "LevelŁ" apart
        assert_ne!(mangle_name("Level 1"), mangle_name("Level\u{141}"));
        assert_eq!(mangle_name(""), "");
    }

    #[test]
    fn test_mangle_function_name_is_stable() {
        let f = FunctionEvent::new("Spawn wave", "Enemy");
        let first = mangle_function_name("Level 1", &f);
        assert_eq!(first, "evfn__Level_0000201__Spawn_000020wave");
        assert_eq!(mangle_function_name("Level 1", &f), first);
    }

    #[test]
    fn test_mangle_function_name_has_no_collisions() {
        // Naive concatenation would map both pairs to "abc"
        let a = mangle_function_name("a", &FunctionEvent::new("bc", ""));
        let b = mangle_function_name("ab", &FunctionEvent::new("c", ""));
        assert_ne!(a, b);

        // Separator-looking input is escaped
        let c = mangle_function_name("a__b", &FunctionEvent::new("c", ""));
        let d = mangle_function_name("a", &FunctionEvent::new("b__c", ""));
        assert_ne!(c, d);
    }

    #[test]
    fn test_search_descends_into_every_kind() {
        let tree: EventTree = vec![
            StandardEvent::new()
                .with_sub_event(GroupEvent::new("g").with_sub_event(marked("deep", "in-group")))
                .into(),
            FunctionEvent::new("outer", "")
                .with_sub_event(marked("nested", "in-function"))
                .into(),
        ]
        .into();

        let deep = search_for_function_in_events(&tree, "deep").unwrap();
        assert_eq!(deep.actions[0].operation, "in-group");
        let nested = search_for_function_in_events(&tree, "nested").unwrap();
        assert_eq!(nested.actions[0].operation, "in-function");
        assert!(search_for_function_in_events(&tree, "outer").is_some());
        assert!(search_for_function_in_events(&tree, "missing").is_none());
    }

    #[test]
    fn test_search_first_match_wins() {
        // The nested duplicate comes first in depth-first sibling order
        let tree: EventTree = vec![
            GroupEvent::new("g")
                .with_sub_event(marked("dup", "first"))
                .into(),
            marked("dup", "second").into(),
        ]
        .into();
        let found = search_for_function_in_events(&tree, "dup").unwrap();
        assert_eq!(found.actions[0].operation, "first");

        // A shallower duplicate that comes first wins over a deeper one
        let tree: EventTree = vec![
            marked("dup", "shallow").into(),
            GroupEvent::new("g")
                .with_sub_event(marked("dup", "deep"))
                .into(),
        ]
        .into();
        let found = search_for_function_in_events(&tree, "dup").unwrap();
        assert_eq!(found.actions[0].operation, "shallow");
    }

    #[test]
    fn test_functions_in_events() {
        let tree: EventTree = vec![
            marked("a", "x").into(),
            GroupEvent::new("g").with_sub_event(marked("b", "y")).into(),
        ]
        .into();
        let names: Vec<&str> = functions_in_events(&tree)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
