// Object Lists - The picking context of an event
//
// Maps object names to the instances currently picked for them. Conditions
// narrow the lists in place and actions operate on whatever survived. Lists
// are filled lazily with every live instance the first time an event refers
// to an object.

use std::collections::BTreeMap;

use crate::objects::{ObjectHandle, ObjectStore};

/// Named lists of picked object instances
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectLists {
    lists: BTreeMap<String, Vec<ObjectHandle>>,
}

impl ObjectLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list for `name`
    pub fn insert(&mut self, name: impl Into<String>, objects: Vec<ObjectHandle>) {
        self.lists.insert(name.into(), objects);
    }

    /// Picked objects for `name`, `None` if the list was never filled
    pub fn get(&self, name: &str) -> Option<&[ObjectHandle]> {
        self.lists.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<ObjectHandle>> {
        self.lists.remove(name)
    }

    /// Names of the filled lists
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    /// Total number of picked objects across every list
    pub fn picked_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// The list for `name`, filled with every live instance of that object
    /// if this is the first reference to it
    pub fn ensure(&mut self, name: &str, store: &ObjectStore) -> &mut Vec<ObjectHandle> {
        self.lists
            .entry(name.to_string())
            .or_insert_with(|| store.instances_of(name))
    }

    /// Add a freshly created object. The list starts empty (not with every
    /// instance) when the object was not referenced before.
    pub fn add_created(&mut self, name: &str, object: ObjectHandle) {
        self.lists.entry(name.to_string()).or_default().push(object);
    }

    /// Keep, in every list, only the objects matching `predicate`.
    /// Returns whether any object remains in any list.
    pub fn pick_if<F>(&mut self, mut predicate: F) -> bool
    where
        F: FnMut(ObjectHandle) -> bool,
    {
        let mut any = false;
        for objects in self.lists.values_mut() {
            objects.retain(|handle| predicate(*handle));
            any |= !objects.is_empty();
        }
        any
    }

    /// Move the named lists out into their own context (missing names are
    /// skipped)
    pub fn split_off(&mut self, names: &[&str]) -> ObjectLists {
        let mut subset = ObjectLists::new();
        for name in names {
            if let Some(objects) = self.lists.remove(*name) {
                subset.lists.insert((*name).to_string(), objects);
            }
        }
        subset
    }

    /// Move every list of `other` back in, replacing same-named lists
    pub fn merge(&mut self, other: ObjectLists) {
        self.lists.extend(other.lists);
    }

    /// Drop handles whose instances were destroyed
    pub fn retain_live(&mut self, store: &ObjectStore) {
        for objects in self.lists.values_mut() {
            objects.retain(|handle| store.is_alive(*handle));
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<ObjectHandle>)> for ObjectLists {
    fn from_iter<I: IntoIterator<Item = (S, Vec<ObjectHandle>)>>(iter: I) -> Self {
        Self {
            lists: iter
                .into_iter()
                .map(|(name, objects)| (name.into(), objects))
                .collect(),
        }
    }
}
