// Object Store - Live object instances of a running scene
//
// Instances live in a slot arena. Handles carry the slot generation, so a
// handle to a destroyed instance stays detectably stale even after its slot
// is reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Object Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Generation-checked reference to an object instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    /// Slot index of the instance
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Object Instance
// ─────────────────────────────────────────────────────────────────────────────

/// A live object instance
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    /// Object name, i.e. the object list this instance belongs to
    pub name: String,
    /// Instance variables
    pub variables: BTreeMap<String, Value>,
}

impl ObjectInstance {
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Object Store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    instance: Option<ObjectInstance>,
}

/// Arena owning every live instance of a scene
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance of the named object
    pub fn create(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.insert(ObjectInstance {
            name: name.into(),
            variables: BTreeMap::new(),
        })
    }

    /// Insert a fully built instance
    pub fn insert(&mut self, instance: ObjectInstance) -> ObjectHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.instance = Some(instance);
            return ObjectHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            instance: Some(instance),
        });
        ObjectHandle {
            index,
            generation: 0,
        }
    }

    /// Destroy an instance. Returns it, or `None` if the handle was stale.
    pub fn destroy(&mut self, handle: ObjectHandle) -> Option<ObjectInstance> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let instance = slot.instance.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(instance)
    }

    /// Whether the handle still refers to a live instance
    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&ObjectInstance> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.instance.as_ref())
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut ObjectInstance> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.instance.as_mut())
    }

    /// Iterate over live instances in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &ObjectInstance)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.instance.as_ref().map(|instance| {
                (
                    ObjectHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    instance,
                )
            })
        })
    }

    /// Handles of every live instance of the named object
    pub fn instances_of(&self, name: &str) -> Vec<ObjectHandle> {
        self.iter()
            .filter(|(_, instance)| instance.name == name)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
