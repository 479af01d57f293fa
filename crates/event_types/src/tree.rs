// Event Tree - Ordered, owning list of event nodes
//
// Sibling order is execution order. Nodes are moved in and out by value, so a
// node can only ever live in one tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EventsError, EventsResult};
use crate::event::EventNode;

/// An ordered list of events (a scene's events or a node's sub-events)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTree {
    events: Vec<EventNode>,
}

impl EventTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get a direct child by position
    pub fn get(&self, index: usize) -> Option<&EventNode> {
        self.events.get(index)
    }

    /// Get a mutable direct child by position
    pub fn get_mut(&mut self, index: usize) -> Option<&mut EventNode> {
        self.events.get_mut(index)
    }

    /// Iterate over direct children in order
    pub fn iter(&self) -> std::slice::Iter<'_, EventNode> {
        self.events.iter()
    }

    /// Iterate mutably over direct children in order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, EventNode> {
        self.events.iter_mut()
    }

    /// Append an event at the end
    pub fn push(&mut self, event: impl Into<EventNode>) {
        self.events.push(event.into());
    }

    /// Insert an event at `index` (`index == len` appends)
    pub fn insert(&mut self, index: usize, event: impl Into<EventNode>) -> EventsResult<()> {
        if index > self.events.len() {
            return Err(EventsError::IndexOutOfRange {
                index,
                len: self.events.len(),
            });
        }
        self.events.insert(index, event.into());
        Ok(())
    }

    /// Detach and return the event at `index`
    pub fn remove(&mut self, index: usize) -> EventsResult<EventNode> {
        if index >= self.events.len() {
            return Err(EventsError::IndexOutOfRange {
                index,
                len: self.events.len(),
            });
        }
        Ok(self.events.remove(index))
    }

    /// Move the event at `from` so that it ends up at position `to`
    pub fn move_event(&mut self, from: usize, to: usize) -> EventsResult<()> {
        let len = self.events.len();
        if from >= len {
            return Err(EventsError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(EventsError::IndexOutOfRange { index: to, len });
        }
        let event = self.events.remove(from);
        self.events.insert(to, event);
        Ok(())
    }

    /// Move the event at `from` into `target` at `to`. The event is detached
    /// before insertion; on a bad target index it is put back where it was.
    pub fn transfer(&mut self, from: usize, target: &mut EventTree, to: usize) -> EventsResult<()> {
        if to > target.len() {
            return Err(EventsError::IndexOutOfRange {
                index: to,
                len: target.len(),
            });
        }
        let event = self.remove(from)?;
        target.events.insert(to, event);
        Ok(())
    }

    /// Remove every event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Visit every node depth-first, in sibling order, descending into the
    /// sub-events of every node that can have them. The visitor receives the
    /// nesting depth (0 for direct children).
    pub fn walk<'a, F>(&'a self, visitor: &mut F)
    where
        F: FnMut(&'a EventNode, usize),
    {
        self.walk_at(0, visitor);
    }

    fn walk_at<'a, F>(&'a self, depth: usize, visitor: &mut F)
    where
        F: FnMut(&'a EventNode, usize),
    {
        for event in &self.events {
            visitor(event, depth);
            if event.can_have_sub_events() {
                event.sub_events().walk_at(depth + 1, visitor);
            }
        }
    }

    /// Total number of nodes, sub-events included
    pub fn count_events(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    /// Write the whole tree into a serializer element
    pub fn serialize_to(&self) -> EventsResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Read a tree back from a serializer element
    pub fn unserialize_from(element: &Value) -> EventsResult<Self> {
        Ok(EventTree::deserialize(element)?)
    }
}

impl From<Vec<EventNode>> for EventTree {
    fn from(events: Vec<EventNode>) -> Self {
        Self { events }
    }
}

impl FromIterator<EventNode> for EventTree {
    fn from_iter<I: IntoIterator<Item = EventNode>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EventTree {
    type Item = &'a EventNode;
    type IntoIter = std::slice::Iter<'a, EventNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl IntoIterator for EventTree {
    type Item = EventNode;
    type IntoIter = std::vec::IntoIter<EventNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
