// Object Links Manager - Symmetric links between live objects
//
// Each running scene owns one manager. Links hold handles, never instances:
// the object store decides lifetimes and tells the manager when an instance
// goes away. Handles that went stale without that notification are filtered
// by the scene before results reach events.

use std::collections::HashMap;

use crate::objects::{ObjectHandle, ObjectStore};

/// Undirected link graph between object instances
#[derive(Debug, Clone, Default)]
pub struct ObjectLinksManager {
    links: HashMap<ObjectHandle, Vec<ObjectHandle>>,
}

impl ObjectLinksManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `a` and `b` in both directions. Linking an object to itself and
    /// linking an already linked pair do nothing.
    pub fn link_objects(&mut self, a: ObjectHandle, b: ObjectHandle) {
        if a == b {
            return;
        }
        Self::attach(&mut self.links, a, b);
        Self::attach(&mut self.links, b, a);
    }

    /// Remove the link between `a` and `b`, if any
    pub fn remove_link_between(&mut self, a: ObjectHandle, b: ObjectHandle) {
        Self::detach(&mut self.links, a, b);
        Self::detach(&mut self.links, b, a);
    }

    /// Remove every link touching `object`
    pub fn remove_all_links_of(&mut self, object: ObjectHandle) {
        let Some(linked) = self.links.remove(&object) else {
            return;
        };
        for other in linked {
            Self::detach(&mut self.links, other, object);
        }
    }

    /// Objects linked with `object`, in the order the links were made.
    /// Empty for an object without links.
    pub fn get_objects_linked_with(&self, object: ObjectHandle) -> Vec<ObjectHandle> {
        self.links.get(&object).cloned().unwrap_or_default()
    }

    /// Whether `a` and `b` are linked
    pub fn are_linked(&self, a: ObjectHandle, b: ObjectHandle) -> bool {
        self.links.get(&a).is_some_and(|linked| linked.contains(&b))
    }

    /// Number of distinct links
    pub fn link_count(&self) -> usize {
        self.links.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Drop every link
    pub fn clear(&mut self) {
        self.links.clear();
    }

    /// Drop links touching handles that are no longer alive in `store`.
    /// Returns how many stale objects were cleaned up.
    pub fn prune_stale(&mut self, store: &ObjectStore) -> usize {
        let stale: Vec<ObjectHandle> = self
            .links
            .keys()
            .copied()
            .filter(|handle| !store.is_alive(*handle))
            .collect();
        for handle in &stale {
            self.remove_all_links_of(*handle);
        }
        stale.len()
    }

    fn attach(
        links: &mut HashMap<ObjectHandle, Vec<ObjectHandle>>,
        from: ObjectHandle,
        to: ObjectHandle,
    ) {
        let linked = links.entry(from).or_default();
        if !linked.contains(&to) {
            linked.push(to);
        }
    }

    fn detach(
        links: &mut HashMap<ObjectHandle, Vec<ObjectHandle>>,
        from: ObjectHandle,
        to: ObjectHandle,
    ) {
        if let Some(linked) = links.get_mut(&from) {
            linked.retain(|handle| *handle != to);
            if linked.is_empty() {
                links.remove(&from);
            }
        }
    }
}
