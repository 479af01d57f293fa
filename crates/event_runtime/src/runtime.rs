// Runtime - Host for running scenes
//
// Owns every running scene, keyed by its id. Each scene carries its own link
// graph, so scenes running side by side never see each other's links.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use event_types::Layout;

use crate::error::{ExecutionError, ExecutionResult};
use crate::interpreter::EventsExecutor;
use crate::registry::InstructionRegistry;
use crate::scene::{RuntimeScene, SceneId};

/// Default simulated duration of one step, in seconds
pub const DEFAULT_TIME_STEP: f64 = 1.0 / 60.0;

/// Runs scenes against an instruction registry
pub struct Runtime {
    executor: EventsExecutor,
    scenes: HashMap<SceneId, RuntimeScene>,
    time_step: f64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(InstructionRegistry::with_builtins()))
    }
}

impl Runtime {
    pub fn new(registry: Arc<InstructionRegistry>) -> Self {
        Self {
            executor: EventsExecutor::new(registry),
            scenes: HashMap::new(),
            time_step: DEFAULT_TIME_STEP,
        }
    }

    /// Set the simulated duration of one step
    pub fn with_time_step(mut self, seconds: f64) -> Self {
        self.time_step = seconds;
        self
    }

    pub fn executor(&self) -> &EventsExecutor {
        &self.executor
    }

    /// Start a scene from its layout
    pub fn start_scene(&mut self, layout: &Layout) -> SceneId {
        self.insert_scene(RuntimeScene::from_layout(layout))
    }

    /// Start an already built scene
    pub fn insert_scene(&mut self, scene: RuntimeScene) -> SceneId {
        let id = scene.id();
        info!(scene = %id, name = %scene.name(), "Starting scene");
        self.scenes.insert(id, scene);
        id
    }

    /// Stop a scene, discarding it with its objects and links
    pub fn stop_scene(&mut self, id: SceneId) -> Option<RuntimeScene> {
        let scene = self.scenes.remove(&id)?;
        info!(scene = %id, steps = scene.step_count(), "Stopped scene");
        Some(scene)
    }

    pub fn scene(&self, id: SceneId) -> Option<&RuntimeScene> {
        self.scenes.get(&id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut RuntimeScene> {
        self.scenes.get_mut(&id)
    }

    /// Ids of the running scenes
    pub fn scene_ids(&self) -> Vec<SceneId> {
        self.scenes.keys().copied().collect()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Run one step of a scene: drop links to destroyed objects, run its
    /// events once, then advance its clock
    pub fn step(&mut self, id: SceneId) -> ExecutionResult<()> {
        let scene = self
            .scenes
            .get_mut(&id)
            .ok_or(ExecutionError::SceneNotFound(id))?;
        let pruned = scene.links.prune_stale(&scene.objects);
        if pruned > 0 {
            debug!(scene = %id, pruned, "Pruned links of destroyed objects");
        }
        let events = scene.events();
        self.executor.run(&events, scene)?;
        scene.advance(self.time_step);
        debug!(scene = %id, step = scene.step_count(), "Stepped scene");
        Ok(())
    }

    /// Step every running scene once. Stops at the first failing scene.
    pub fn step_all(&mut self) -> ExecutionResult<()> {
        for id in self.scene_ids() {
            self.step(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_unknown_scene() {
        let mut runtime = Runtime::default();
        let id = SceneId::new();
        assert!(matches!(runtime.step(id), Err(ExecutionError::SceneNotFound(missing)) if missing == id));
    }

    #[test]
    fn test_step_advances_clock() {
        let mut runtime = Runtime::default().with_time_step(0.5);
        let id = runtime.start_scene(&Layout::new("Level"));
        runtime.step(id).unwrap();
        runtime.step(id).unwrap();

        let scene = runtime.scene(id).unwrap();
        assert_eq!(scene.step_count(), 2);
        assert!((scene.elapsed() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_step_prunes_links_of_objects_destroyed_directly() {
        let mut runtime = Runtime::default();
        let id = runtime.start_scene(&Layout::new("Level"));

        let scene = runtime.scene_mut(id).unwrap();
        let tank = scene.create_object("Tank");
        let turret = scene.create_object("Turret");
        scene.links.link_objects(tank, turret);
        scene.objects.destroy(turret);
        assert_eq!(scene.links.link_count(), 1);

        runtime.step(id).unwrap();

        let scene = runtime.scene(id).unwrap();
        assert!(scene.links.is_empty());
        assert!(scene.links.get_objects_linked_with(tank).is_empty());
    }

    #[test]
    fn test_stop_scene() {
        let mut runtime = Runtime::default();
        let id = runtime.start_scene(&Layout::new("Level"));
        assert_eq!(runtime.scene_count(), 1);

        let scene = runtime.stop_scene(id).unwrap();
        assert_eq!(scene.name(), "Level");
        assert_eq!(runtime.scene_count(), 0);
        assert!(runtime.stop_scene(id).is_none());
    }
}
