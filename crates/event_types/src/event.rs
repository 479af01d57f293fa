// Event Nodes - The polymorphic unit of an event tree
//
// Node kinds form a closed set. Capabilities (carrying conditions/actions,
// holding sub-events) are fixed per kind and every consumer matches on the
// kind exhaustively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EventsResult;
use crate::instruction::{self, Instruction, InstructionKind};
use crate::lenient;
use crate::tree::EventTree;

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// An RGB color with 0-255 components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Default background of a group
    pub const GROUP: Rgb = Rgb::new(74, 176, 228);
    /// Default background of a comment
    pub const COMMENT: Rgb = Rgb::new(255, 230, 109);
    /// Default text color of a comment
    pub const COMMENT_TEXT: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

fn group_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
    lenient::or_else(deserializer, Rgb::GROUP)
}

fn comment_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
    lenient::or_else(deserializer, Rgb::COMMENT)
}

fn comment_text_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
    lenient::or_else(deserializer, Rgb::COMMENT_TEXT)
}

fn default_group_color() -> Rgb {
    Rgb::GROUP
}

fn default_comment_color() -> Rgb {
    Rgb::COMMENT
}

fn default_comment_text_color() -> Rgb {
    Rgb::COMMENT_TEXT
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

// ─────────────────────────────────────────────────────────────────────────────
// Standard Event
// ─────────────────────────────────────────────────────────────────────────────

/// Conditions, actions and sub-events: the workhorse node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardEvent {
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub disabled: bool,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub folded: bool,
    #[serde(default)]
    pub conditions: Vec<Instruction>,
    #[serde(default)]
    pub actions: Vec<Instruction>,
    #[serde(default, skip_serializing_if = "EventTree::is_empty")]
    pub events: EventTree,
}

impl StandardEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, condition: Instruction) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Instruction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_sub_event(mut self, event: impl Into<EventNode>) -> Self {
        self.events.push(event.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Group Event
// ─────────────────────────────────────────────────────────────────────────────

/// A purely organizational node: sub-events plus display properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEvent {
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub disabled: bool,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub folded: bool,
    /// Name displayed in the editor
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    /// URL the group was downloaded from, empty when unknown
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "lenient::or_default"
    )]
    pub source: String,
    /// Seconds since the epoch at which the group was created from a
    /// template, 0 when unset
    #[serde(
        default,
        skip_serializing_if = "is_zero",
        deserialize_with = "lenient::or_default"
    )]
    pub creation_time: u32,
    /// Parameters used to create the group from a template
    #[serde(
        default,
        rename = "parameters",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "lenient::or_default"
    )]
    pub creation_parameters: Vec<String>,
    #[serde(default = "default_group_color", deserialize_with = "group_color")]
    pub color: Rgb,
    #[serde(default)]
    pub events: EventTree,
}

impl Default for GroupEvent {
    fn default() -> Self {
        Self {
            disabled: false,
            folded: false,
            name: String::new(),
            source: String::new(),
            creation_time: 0,
            creation_parameters: Vec::new(),
            color: Rgb::GROUP,
            events: EventTree::new(),
        }
    }
}

impl GroupEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_sub_event(mut self, event: impl Into<EventNode>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Change the background color of the group
    pub fn set_background_color(&mut self, r: u8, g: u8, b: u8) {
        self.color = Rgb::new(r, g, b);
    }

    /// Creation time as a date, `None` when unset
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.creation_time == 0 {
            return None;
        }
        DateTime::from_timestamp(i64::from(self.creation_time), 0)
    }

    /// Record the creation time. Dates outside the storable range reset it
    /// to unset.
    pub fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.creation_time = u32::try_from(at.timestamp()).unwrap_or(0);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Function Event
// ─────────────────────────────────────────────────────────────────────────────

/// A named block invoked by actions instead of running in place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub disabled: bool,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub folded: bool,
    /// Name used to look up and invoke the function
    #[serde(default)]
    pub name: String,
    /// Object list name the caller's objects are bound to inside the body
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub objects_passed_as_argument: String,
    #[serde(default)]
    pub conditions: Vec<Instruction>,
    #[serde(default)]
    pub actions: Vec<Instruction>,
    #[serde(default, skip_serializing_if = "EventTree::is_empty")]
    pub events: EventTree,
}

impl FunctionEvent {
    pub fn new(name: impl Into<String>, objects_passed_as_argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects_passed_as_argument: objects_passed_as_argument.into(),
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: Instruction) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Instruction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_sub_event(mut self, event: impl Into<EventNode>) -> Self {
        self.events.push(event.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Comment Event
// ─────────────────────────────────────────────────────────────────────────────

/// Free text shown between events, never executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEvent {
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub disabled: bool,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient::or_default"
    )]
    pub folded: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub text: String,
    #[serde(default = "default_comment_color", deserialize_with = "comment_color")]
    pub color: Rgb,
    #[serde(
        default = "default_comment_text_color",
        deserialize_with = "comment_text_color"
    )]
    pub text_color: Rgb,
}

impl CommentEvent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            disabled: false,
            folded: false,
            text: text.into(),
            color: Rgb::COMMENT,
            text_color: Rgb::COMMENT_TEXT,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event Node
// ─────────────────────────────────────────────────────────────────────────────

/// A node of an event tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventNode {
    Standard(StandardEvent),
    Group(GroupEvent),
    Function(FunctionEvent),
    Comment(CommentEvent),
}

impl From<StandardEvent> for EventNode {
    fn from(event: StandardEvent) -> Self {
        EventNode::Standard(event)
    }
}

impl From<GroupEvent> for EventNode {
    fn from(event: GroupEvent) -> Self {
        EventNode::Group(event)
    }
}

impl From<FunctionEvent> for EventNode {
    fn from(event: FunctionEvent) -> Self {
        EventNode::Function(event)
    }
}

impl From<CommentEvent> for EventNode {
    fn from(event: CommentEvent) -> Self {
        EventNode::Comment(event)
    }
}

impl EventNode {
    /// Serialized type tag of this node
    pub fn type_name(&self) -> &'static str {
        match self {
            EventNode::Standard(_) => "Standard",
            EventNode::Group(_) => "Group",
            EventNode::Function(_) => "Function",
            EventNode::Comment(_) => "Comment",
        }
    }

    /// Whether this node carries its own conditions and actions
    pub fn is_executable(&self) -> bool {
        match self {
            EventNode::Standard(_) | EventNode::Function(_) => true,
            EventNode::Group(_) | EventNode::Comment(_) => false,
        }
    }

    /// Whether this node can hold sub-events
    pub fn can_have_sub_events(&self) -> bool {
        match self {
            EventNode::Standard(_) | EventNode::Group(_) | EventNode::Function(_) => true,
            EventNode::Comment(_) => false,
        }
    }

    /// Whether this node can hold sub-events and holds at least one
    pub fn has_sub_events(&self) -> bool {
        self.can_have_sub_events() && !self.sub_events().is_empty()
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            EventNode::Standard(e) => e.disabled,
            EventNode::Group(e) => e.disabled,
            EventNode::Function(e) => e.disabled,
            EventNode::Comment(e) => e.disabled,
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        match self {
            EventNode::Standard(e) => e.disabled = disabled,
            EventNode::Group(e) => e.disabled = disabled,
            EventNode::Function(e) => e.disabled = disabled,
            EventNode::Comment(e) => e.disabled = disabled,
        }
    }

    pub fn is_folded(&self) -> bool {
        match self {
            EventNode::Standard(e) => e.folded,
            EventNode::Group(e) => e.folded,
            EventNode::Function(e) => e.folded,
            EventNode::Comment(e) => e.folded,
        }
    }

    pub fn set_folded(&mut self, folded: bool) {
        match self {
            EventNode::Standard(e) => e.folded = folded,
            EventNode::Group(e) => e.folded = folded,
            EventNode::Function(e) => e.folded = folded,
            EventNode::Comment(e) => e.folded = folded,
        }
    }

    /// Conditions of an executable node
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn conditions(&self) -> &[Instruction] {
        match self {
            EventNode::Standard(e) => &e.conditions,
            EventNode::Function(e) => &e.conditions,
            other => capability_violation(other.type_name(), "conditions"),
        }
    }

    /// Mutable conditions of an executable node
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn conditions_mut(&mut self) -> &mut Vec<Instruction> {
        match self {
            EventNode::Standard(e) => &mut e.conditions,
            EventNode::Function(e) => &mut e.conditions,
            other => capability_violation(other.type_name(), "conditions"),
        }
    }

    /// Actions of an executable node
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn actions(&self) -> &[Instruction] {
        match self {
            EventNode::Standard(e) => &e.actions,
            EventNode::Function(e) => &e.actions,
            other => capability_violation(other.type_name(), "actions"),
        }
    }

    /// Mutable actions of an executable node
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn actions_mut(&mut self) -> &mut Vec<Instruction> {
        match self {
            EventNode::Standard(e) => &mut e.actions,
            EventNode::Function(e) => &mut e.actions,
            other => capability_violation(other.type_name(), "actions"),
        }
    }

    /// Sub-events of a node that can have them
    ///
    /// # Panics
    ///
    /// Panics if the node cannot have sub-events.
    pub fn sub_events(&self) -> &EventTree {
        match self {
            EventNode::Standard(e) => &e.events,
            EventNode::Group(e) => &e.events,
            EventNode::Function(e) => &e.events,
            other => capability_violation(other.type_name(), "sub-events"),
        }
    }

    /// Mutable sub-events of a node that can have them
    ///
    /// # Panics
    ///
    /// Panics if the node cannot have sub-events.
    pub fn sub_events_mut(&mut self) -> &mut EventTree {
        match self {
            EventNode::Standard(e) => &mut e.events,
            EventNode::Group(e) => &mut e.events,
            EventNode::Function(e) => &mut e.events,
            other => capability_violation(other.type_name(), "sub-events"),
        }
    }

    /// Every instruction list of the node with its kind; empty for
    /// non-executable nodes
    pub fn instruction_lists(&self) -> Vec<(InstructionKind, &[Instruction])> {
        if !self.is_executable() {
            return Vec::new();
        }
        vec![
            (InstructionKind::Condition, self.conditions()),
            (InstructionKind::Action, self.actions()),
        ]
    }

    /// Insert a condition at `index` (`index == len` appends)
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn insert_condition(&mut self, index: usize, condition: Instruction) -> EventsResult<()> {
        instruction::insert_at(self.conditions_mut(), index, condition)
    }

    /// Remove the condition at `index`
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn remove_condition(&mut self, index: usize) -> EventsResult<Instruction> {
        instruction::remove_at(self.conditions_mut(), index)
    }

    /// Insert an action at `index` (`index == len` appends)
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn insert_action(&mut self, index: usize, action: Instruction) -> EventsResult<()> {
        instruction::insert_at(self.actions_mut(), index, action)
    }

    /// Remove the action at `index`
    ///
    /// # Panics
    ///
    /// Panics if the node is not executable.
    pub fn remove_action(&mut self, index: usize) -> EventsResult<Instruction> {
        instruction::remove_at(self.actions_mut(), index)
    }

    /// Write this node into a serializer element
    pub fn serialize_to(&self) -> EventsResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Read a node back from a serializer element
    pub fn unserialize_from(element: &Value) -> EventsResult<Self> {
        Ok(EventNode::deserialize(element)?)
    }
}

fn capability_violation(type_name: &str, accessor: &str) -> ! {
    panic!("contract violation: {type_name} event has no {accessor}")
}
