// Linked Objects - Scene-level link tools used by instructions
//
// These take the running scene explicitly and accept missing objects
// (`None`) or stale handles, which make every operation a no-op.

use tracing::debug;

use crate::object_lists::ObjectLists;
use crate::objects::ObjectHandle;
use crate::scene::RuntimeScene;

fn live(scene: &RuntimeScene, object: Option<ObjectHandle>) -> Option<ObjectHandle> {
    object.filter(|handle| scene.objects.is_alive(*handle))
}

/// Narrow every list of `picked_lists` to the objects linked with `object`.
///
/// Returns whether any object remains picked in any list. A missing or
/// destroyed `object` returns false and leaves the lists untouched.
pub fn pick_objects_linked_to(
    scene: &RuntimeScene,
    picked_lists: &mut ObjectLists,
    object: Option<ObjectHandle>,
) -> bool {
    let Some(object) = live(scene, object) else {
        return false;
    };

    let linked = scene.objects_linked_with(object);
    debug!(object = %object, linked = linked.len(), "Picking linked objects");
    picked_lists.pick_if(|handle| linked.contains(&handle))
}

/// Link two objects of the scene
pub fn link_objects(scene: &mut RuntimeScene, a: Option<ObjectHandle>, b: Option<ObjectHandle>) {
    let (Some(a), Some(b)) = (live(scene, a), live(scene, b)) else {
        return;
    };
    scene.links.link_objects(a, b);
}

/// Remove the link between two objects of the scene
pub fn remove_link_between(
    scene: &mut RuntimeScene,
    a: Option<ObjectHandle>,
    b: Option<ObjectHandle>,
) {
    let (Some(a), Some(b)) = (a, b) else {
        return;
    };
    scene.links.remove_link_between(a, b);
}

/// Remove every link of an object of the scene
pub fn remove_all_links_of(scene: &mut RuntimeScene, object: Option<ObjectHandle>) {
    if let Some(object) = object {
        scene.links.remove_all_links_of(object);
    }
}
