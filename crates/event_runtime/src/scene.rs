// Runtime Scene - State of one running scene
//
// A running scene owns its objects, its link graph and its variables. Code
// that needs link queries receives the scene by reference; there is no
// process-wide manager table.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use event_types::{EventTree, Layout};

use crate::links::ObjectLinksManager;
use crate::objects::{ObjectHandle, ObjectInstance, ObjectStore};

/// Identity of a running scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId(Uuid);

impl SceneId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scene being simulated
#[derive(Debug)]
pub struct RuntimeScene {
    id: SceneId,
    name: String,
    events: Arc<EventTree>,
    /// Live instances. Destroy through [`RuntimeScene::delete_object`] so
    /// links are cleaned up; stale handles are tolerated either way.
    pub objects: ObjectStore,
    /// Link graph between instances of this scene
    pub links: ObjectLinksManager,
    /// Scene variables
    pub variables: BTreeMap<String, Value>,
    elapsed: f64,
    step_count: u64,
}

impl RuntimeScene {
    /// Create an empty scene with no events
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(),
            name: name.into(),
            events: Arc::new(EventTree::new()),
            objects: ObjectStore::new(),
            links: ObjectLinksManager::new(),
            variables: BTreeMap::new(),
            elapsed: 0.0,
            step_count: 0,
        }
    }

    /// Build a scene from its layout: variables, initial instances and events
    pub fn from_layout(layout: &Layout) -> Self {
        let mut scene = Self::new(layout.name.clone());
        scene.events = Arc::new(layout.events.clone());
        scene.variables = layout.variables.clone();
        for initial in &layout.instances {
            scene.objects.insert(ObjectInstance {
                name: initial.object.clone(),
                variables: initial.variables.clone(),
            });
        }
        scene
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Events run at every step
    pub fn events(&self) -> Arc<EventTree> {
        Arc::clone(&self.events)
    }

    /// Replace the events run at every step
    pub fn set_events(&mut self, events: EventTree) {
        self.events = Arc::new(events);
    }

    /// Seconds simulated so far
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Account for a completed step of `dt` seconds
    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
        self.step_count += 1;
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Create an object instance
    pub fn create_object(&mut self, name: impl Into<String>) -> ObjectHandle {
        self.objects.create(name)
    }

    /// Destroy an object instance, removing its links first. Returns false
    /// for a stale handle.
    pub fn delete_object(&mut self, object: ObjectHandle) -> bool {
        self.links.remove_all_links_of(object);
        self.objects.destroy(object).is_some()
    }

    /// Live objects linked with `object`; empty for a stale handle
    pub fn objects_linked_with(&self, object: ObjectHandle) -> Vec<ObjectHandle> {
        if !self.objects.is_alive(object) {
            return Vec::new();
        }
        let mut linked = self.links.get_objects_linked_with(object);
        linked.retain(|handle| self.objects.is_alive(*handle));
        linked
    }
}
