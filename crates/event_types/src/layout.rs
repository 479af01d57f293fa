// Layout - The serialized definition of a scene
//
// A layout names the scene, declares initial variables and object instances,
// and owns the scene's event tree. Layouts are stored as JSON files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventsResult;
use crate::event::FunctionEvent;
use crate::function;
use crate::tree::EventTree;

/// An object instance placed in the scene before the first step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialInstance {
    /// Object name (the object list the instance belongs to)
    pub object: String,
    /// Initial values of the instance's variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,
}

impl InitialInstance {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

/// Complete scene definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Scene name, also the scope of its function events
    pub name: String,
    /// Scene variables with their initial values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,
    /// Instances created when the scene starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<InitialInstance>,
    /// Events run at every step
    #[serde(default)]
    pub events: EventTree,
}

impl Layout {
    /// Create an empty layout
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a layout from JSON text
    pub fn from_json(json: &str) -> EventsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the layout as pretty-printed JSON
    pub fn to_json(&self) -> EventsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Find a function event declared anywhere in this layout's events
    pub fn find_function(&self, name: &str) -> Option<&FunctionEvent> {
        function::search_for_function_in_events(&self.events, name)
    }

    /// Mangled symbols of every function in the layout, in lookup order
    pub fn function_symbols(&self) -> Vec<(String, String)> {
        function::functions_in_events(&self.events)
            .into_iter()
            .map(|f| (f.name.clone(), function::mangle_function_name(&self.name, f)))
            .collect()
    }
}
