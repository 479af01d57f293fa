// Instruction - A single condition or action reference
//
// Instructions name an operation registered by the runtime and carry the raw
// parameter expressions. Arity is checked by the registry, never here.

use serde::{Deserialize, Serialize};

use crate::error::{EventsError, EventsResult};
use crate::lenient;

// ─────────────────────────────────────────────────────────────────────────────
// Instruction Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Whether an instruction is used as a condition or an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    Condition,
    Action,
}

impl std::fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstructionKind::Condition => write!(f, "condition"),
            InstructionKind::Action => write!(f, "action"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instruction
// ─────────────────────────────────────────────────────────────────────────────

/// A condition or action reference with its ordered parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation identifier (e.g., "variables/Set"), resolved by the registry
    #[serde(rename = "type")]
    pub operation: String,
    /// Parameter expressions, resolved at execution time
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Negates the result (only meaningful for conditions)
    #[serde(
        default,
        skip_serializing_if = "std::ops::Not::not",
        deserialize_with = "lenient::or_default"
    )]
    pub inverted: bool,
}

impl Instruction {
    /// Create an instruction with no parameters
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: Vec::new(),
            inverted: false,
        }
    }

    /// Create an instruction with the given parameters
    pub fn with_parameters<I, S>(operation: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation: operation.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            inverted: false,
        }
    }

    /// Return this instruction with its inverted flag set
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// Get a parameter by position
    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }

    /// Replace the parameter at `index`, growing the list with empty
    /// expressions if needed
    pub fn set_parameter(&mut self, index: usize, value: impl Into<String>) {
        if self.parameters.len() <= index {
            self.parameters.resize(index + 1, String::new());
        }
        self.parameters[index] = value.into();
    }

    /// Number of parameters
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List editing
// ─────────────────────────────────────────────────────────────────────────────

/// Insert into an ordered instruction list, `index == len` appends
pub(crate) fn insert_at(
    list: &mut Vec<Instruction>,
    index: usize,
    instruction: Instruction,
) -> EventsResult<()> {
    if index > list.len() {
        return Err(EventsError::IndexOutOfRange {
            index,
            len: list.len(),
        });
    }
    list.insert(index, instruction);
    Ok(())
}

/// Remove from an ordered instruction list
pub(crate) fn remove_at(list: &mut Vec<Instruction>, index: usize) -> EventsResult<Instruction> {
    if index >= list.len() {
        return Err(EventsError::IndexOutOfRange {
            index,
            len: list.len(),
        });
    }
    Ok(list.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_builders() {
        let instr = Instruction::with_parameters("variables/Set", ["x", "1"]).inverted();
        assert_eq!(instr.operation, "variables/Set");
        assert_eq!(instr.parameter(0), Some("x"));
        assert_eq!(instr.parameter(1), Some("1"));
        assert_eq!(instr.parameter(2), None);
        assert!(instr.inverted);
    }

    #[test]
    fn test_set_parameter_grows() {
        let mut instr = Instruction::new("objects/Create");
        instr.set_parameter(2, "Enemy");
        assert_eq!(instr.parameters, vec!["", "", "Enemy"]);
    }

    #[test]
    fn test_inverted_omitted_when_false() {
        let json = serde_json::to_value(Instruction::new("common/IsTrue")).unwrap();
        assert!(json.get("inverted").is_none());
        assert_eq!(json["type"], "common/IsTrue");

        let parsed: Instruction =
            serde_json::from_str(r#"{"type": "common/IsTrue", "inverted": true}"#).unwrap();
        assert!(parsed.inverted);
        assert!(parsed.parameters.is_empty());
    }

    #[test]
    fn test_malformed_inverted_is_not_inverted() {
        let parsed: Instruction =
            serde_json::from_str(r#"{"type": "common/IsTrue", "inverted": 1}"#).unwrap();
        assert!(!parsed.inverted);
        assert_eq!(parsed.operation, "common/IsTrue");
    }

    #[test]
    fn test_list_editing_bounds() {
        let mut list = vec![Instruction::new("a")];
        insert_at(&mut list, 1, Instruction::new("b")).unwrap();
        insert_at(&mut list, 0, Instruction::new("c")).unwrap();
        assert_eq!(
            list.iter().map(|i| i.operation.as_str()).collect::<Vec<_>>(),
            vec!["c", "a", "b"]
        );

        assert!(matches!(
            insert_at(&mut list, 5, Instruction::new("d")),
            Err(EventsError::IndexOutOfRange { index: 5, len: 3 })
        ));
        assert_eq!(remove_at(&mut list, 1).unwrap().operation, "a");
        assert!(remove_at(&mut list, 2).is_err());
    }
}
