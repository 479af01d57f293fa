//! Event Types - Core data model of the event sheet system
//!
//! This crate contains the pure data structures behind event sheets: the
//! instructions (conditions and actions), the closed set of event node kinds,
//! the ordered event tree, function-event lookup and scene layouts.
//!
//! Everything here is headless: no editor or runtime is needed to build,
//! edit, clone or (de)serialize an event tree.

mod error;
mod event;
mod function;
mod instruction;
mod layout;
mod lenient;
mod tree;

pub use error::*;
pub use event::*;
pub use function::*;
pub use instruction::*;
pub use layout::*;
pub use tree::*;
