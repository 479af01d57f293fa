//! Event Runtime - Execution engine for event sheets
//!
//! This crate contains the live side of event sheets: the object store, the
//! per-scene link graph, object picking, the instruction registry with its
//! built-ins, the events executor and the runtime hosting running scenes.

pub use event_types;

mod builtins;
mod error;
mod executor;
mod interpreter;
mod linked_objects;
mod links;
mod object_lists;
mod objects;
mod registry;
mod runtime;
mod scene;

pub use builtins::*;
pub use error::*;
pub use executor::*;
pub use interpreter::*;
pub use links::*;
pub use object_lists::*;
pub use objects::*;
pub use registry::*;
pub use runtime::*;
pub use scene::*;

/// Link tools taking the running scene explicitly
pub mod linked {
    pub use crate::linked_objects::*;
}
