//! Project Loader
//!
//! Loads project configuration and scenes from disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use event_types::{Layout, mangle_name};
use tokio::fs;
use tracing::{debug, info, warn};

use super::config::*;

const SCENE_EXTENSION: &str = ".scene.json";

/// Error type for project loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Project path does not exist: {0}")]
    PathNotFound(std::path::PathBuf),

    #[error("Project manifest not found: {0}")]
    ManifestNotFound(std::path::PathBuf),

    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

/// Project loader
pub struct ProjectLoader;

impl ProjectLoader {
    /// Load a project from the given path
    pub async fn load(path: impl AsRef<Path>) -> Result<Project, LoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LoadError::PathNotFound(path.to_path_buf()));
        }

        info!("Loading project from: {}", path.display());

        let manifest_path = path.join("project.toml");
        if !manifest_path.exists() {
            return Err(LoadError::ManifestNotFound(manifest_path));
        }

        let manifest_content = fs::read_to_string(&manifest_path).await?;
        let manifest: ProjectManifest = toml::from_str(&manifest_content)?;
        info!("Loaded project manifest: {} ({})", manifest.project.name, manifest.project.id);

        let scenes = Self::load_scenes(path).await?;
        info!("Loaded {} scenes", scenes.len());

        Ok(Project {
            path: path.to_path_buf(),
            manifest,
            scenes,
        })
    }

    /// Load all scenes from the scenes/ directory, in file name order. Files
    /// that fail to parse are skipped with a warning, and a scene name seen
    /// twice keeps its first file.
    async fn load_scenes(project_path: &Path) -> Result<BTreeMap<String, Layout>, LoadError> {
        let scenes_dir = project_path.join("scenes");
        let mut scenes = BTreeMap::new();

        if !scenes_dir.exists() {
            debug!("No scenes directory found");
            return Ok(scenes);
        }

        // Directory order varies by platform
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&scenes_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_scene = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.ends_with(SCENE_EXTENSION));
            if is_scene {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match Self::load_scene(&path).await {
                Ok(scene) => {
                    debug!(
                        "Loaded scene: {} ({} events)",
                        scene.name,
                        scene.events.count_events()
                    );
                    if scenes.contains_key(&scene.name) {
                        warn!("Duplicate scene {} in {}, keeping the first", scene.name, path.display());
                        continue;
                    }
                    scenes.insert(scene.name.clone(), scene);
                }
                Err(e) => {
                    warn!("Failed to load scene from {}: {}", path.display(), e);
                }
            }
        }

        Ok(scenes)
    }

    /// Load a single scene
    async fn load_scene(path: &Path) -> Result<Layout, LoadError> {
        let content = fs::read_to_string(path).await?;
        let scene: Layout = serde_json::from_str(&content)?;
        Ok(scene)
    }

    /// Reload a scene saved by [`ProjectLoader::save_scene`]
    pub async fn reload_scene(
        project_path: &Path,
        scene_name: &str,
    ) -> Result<Option<Layout>, LoadError> {
        let scene_path = Self::scene_path(project_path, scene_name);

        if !scene_path.exists() {
            return Ok(None);
        }

        let scene = Self::load_scene(&scene_path).await?;
        Ok(Some(scene))
    }

    /// Save a scene to disk, in a file named after the scene
    pub async fn save_scene(project_path: &Path, scene: &Layout) -> Result<(), LoadError> {
        let scenes_dir = project_path.join("scenes");
        if !scenes_dir.exists() {
            fs::create_dir_all(&scenes_dir).await?;
        }

        let scene_path = Self::scene_path(project_path, &scene.name);
        let content = serde_json::to_string_pretty(scene)?;
        fs::write(&scene_path, content).await?;

        debug!("Saved scene: {} to {}", scene.name, scene_path.display());
        Ok(())
    }

    /// File of a scene inside scenes/. The name is mangled so separators and
    /// dots never leave the directory.
    fn scene_path(project_path: &Path, scene_name: &str) -> PathBuf {
        project_path
            .join("scenes")
            .join(format!("{}{}", mangle_name(scene_name), SCENE_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    async fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let path = dir.path();

        fs::write(
            path.join("project.toml"),
            r#"
[project]
id = "test-project"
name = "Test Project"
first_scene = "Level"

[runtime]
steps = 3
"#,
        )
        .await
        .unwrap();

        fs::create_dir(path.join("scenes")).await.unwrap();
        fs::write(
            path.join("scenes/level.scene.json"),
            r#"{
                "name": "Level",
                "variables": { "score": 0 },
                "instances": [{ "object": "Player" }],
                "events": [
                    {
                        "type": "Standard",
                        "conditions": [{ "type": "common/IsTrue" }],
                        "actions": [{ "type": "variables/Set", "parameters": ["score", "1"] }]
                    }
                ]
            }"#,
        )
        .await
        .unwrap();
        fs::write(path.join("scenes/broken.scene.json"), "{ not json")
            .await
            .unwrap();
        fs::write(path.join("scenes/notes.txt"), "ignored").await.unwrap();

        dir
    }

    #[tokio::test]
    async fn test_load_project() {
        let dir = create_test_project().await;
        let project = ProjectLoader::load(dir.path()).await.unwrap();

        assert_eq!(project.id(), "test-project");
        assert_eq!(project.name(), "Test Project");
        assert_eq!(project.manifest.project.version, "1.0.0");
        assert_eq!(project.manifest.runtime.steps, 3);
        assert!((project.manifest.runtime.time_step - 1.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(project.scenes.len(), 1);
    }

    #[tokio::test]
    async fn test_load_scene() {
        let dir = create_test_project().await;
        let project = ProjectLoader::load(dir.path()).await.unwrap();

        let scene = project.first_scene().unwrap();
        assert_eq!(scene.name, "Level");
        assert_eq!(scene.instances.len(), 1);
        assert_eq!(scene.events.len(), 1);
        assert!(project.get_scene("Missing").is_none());
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let result = ProjectLoader::load(dir.path()).await;
        assert!(matches!(result, Err(LoadError::ManifestNotFound(_))));

        let result = ProjectLoader::load(dir.path().join("nope")).await;
        assert!(matches!(result, Err(LoadError::PathNotFound(_))));
    }

    #[tokio::test]
    async fn test_save_and_reload_scene() {
        let dir = create_test_project().await;
        let mut scene = Layout::new("Menu");
        scene.variables.insert("music".to_string(), serde_json::json!(true));

        ProjectLoader::save_scene(dir.path(), &scene).await.unwrap();
        let reloaded = ProjectLoader::reload_scene(dir.path(), "Menu")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded, scene);

        assert!(
            ProjectLoader::reload_scene(dir.path(), "Nope")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_save_scene_stays_in_scenes_dir() {
        let dir = create_test_project().await;
        let scene = Layout::new("../Escape");

        ProjectLoader::save_scene(dir.path(), &scene).await.unwrap();

        assert!(!dir.path().join("Escape.scene.json").exists());
        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name();
            assert!(!name.to_string_lossy().ends_with(SCENE_EXTENSION));
        }

        let reloaded = ProjectLoader::reload_scene(dir.path(), "../Escape")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.name, "../Escape");

        let project = ProjectLoader::load(dir.path()).await.unwrap();
        assert!(project.get_scene("../Escape").is_some());
    }

    #[tokio::test]
    async fn test_duplicate_scene_keeps_first_file() {
        let dir = create_test_project().await;
        let path = dir.path();
        fs::write(
            path.join("scenes/b.scene.json"),
            r#"{ "name": "Twin", "variables": { "from": "b" } }"#,
        )
        .await
        .unwrap();
        fs::write(
            path.join("scenes/a.scene.json"),
            r#"{ "name": "Twin", "variables": { "from": "a" } }"#,
        )
        .await
        .unwrap();

        let project = ProjectLoader::load(path).await.unwrap();
        let twin = project.get_scene("Twin").unwrap();
        assert_eq!(twin.variables["from"], serde_json::json!("a"));
        assert_eq!(project.scenes.len(), 2);
    }
}
