//! Project Configuration Types
//!
//! Defines the structure of project files on disk.

use std::collections::BTreeMap;
use std::path::PathBuf;

use event_types::Layout;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Project manifest (project.toml)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectManifest {
    pub project: ProjectInfo,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Project information
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub description: Option<String>,
    /// Scene run when none is named; defaults to the first scene by name
    pub first_scene: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuntimeConfig {
    /// Steps run by default
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Simulated seconds per step
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            time_step: default_time_step(),
        }
    }
}

fn default_steps() -> u32 {
    1
}

fn default_time_step() -> f64 {
    1.0 / 60.0
}

/// Loaded project with all of its scenes
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root path
    pub path: PathBuf,
    /// Project manifest
    pub manifest: ProjectManifest,
    /// Loaded scenes, by name
    pub scenes: BTreeMap<String, Layout>,
}

impl Project {
    /// Get project ID
    pub fn id(&self) -> &str {
        &self.manifest.project.id
    }

    /// Get project name
    pub fn name(&self) -> &str {
        &self.manifest.project.name
    }

    /// Get a scene by name
    pub fn get_scene(&self, name: &str) -> Option<&Layout> {
        self.scenes.get(name)
    }

    /// The scene to run when none is named
    pub fn first_scene(&self) -> Option<&Layout> {
        match &self.manifest.project.first_scene {
            Some(name) => self.scenes.get(name),
            None => self.scenes.values().next(),
        }
    }
}
