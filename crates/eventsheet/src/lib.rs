//! Event Sheet
//!
//! Loads event sheet projects from disk and runs their scenes.

pub mod project;
