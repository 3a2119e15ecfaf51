//! Project management
//!
//! Handles project initialization and provides access to the metadata store
//! and a configured [`CategoryService`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use super::config::PROJECT_DIR;
use super::{Config, MetadataStore};
use crate::domain::Catalog;
use crate::service::CategoryService;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a catcombo project. Run 'catcombo init' first.")]
    NotInProject,
}

/// A catcombo project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Safe to run on an existing project: files that exist are kept and the
    /// default dimension is only created when missing.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create {} directory: {}",
                PROJECT_DIR,
                project_dir.display()
            )
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# catcombo project configuration

[limits]
# E1127: options allowed in one category
max_options_per_category = 50
# E1126: categories allowed in one category combo
max_categories_per_combo = 5
# E1128: option combos one category combo may produce
max_combinations = 500

[pruning]
# Option combo UIDs that are never deleted (the default one is always kept)
protected_option_combos = []
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Interrupted writes\n*.tmp\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let project = Self::open(root)?;

        let mut service = project.service()?;
        if service.generate_default_dimension()? {
            debug!("Created default dimension in {}", project.root.display());
            project.save(service.catalog())?;
        }

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .catcombo directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the metadata store
    pub fn metadata_store(&self) -> MetadataStore {
        MetadataStore::for_project(&self.root)
    }

    /// Loads the persisted catalog
    pub fn load_catalog(&self) -> Result<Catalog> {
        self.metadata_store().load()
    }

    /// Loads the catalog into a service using the project's limits and
    /// protected option combos
    pub fn service(&self) -> Result<CategoryService> {
        let catalog = self.load_catalog()?;
        let project = &self.config.project;

        Ok(CategoryService::new(catalog)
            .with_limits(project.limits)
            .with_guard(project.pruning.guard()))
    }

    /// Writes the catalog back to the metadata store
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        self.metadata_store().save(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DEFAULT_OPTION_COMBO_UID;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.project_dir().join("config.toml").is_file());
        assert!(project.project_dir().join(".gitignore").is_file());
        assert!(project.metadata_store().path().is_file());
    }

    #[test]
    fn init_creates_default_dimension() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let catalog = project.load_catalog().unwrap();
        let default = catalog.default_option_combo().unwrap();
        assert_eq!(default.uid.as_str(), DEFAULT_OPTION_COMBO_UID);
        assert_eq!(catalog.option_combos().count(), 1);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        let first = fs::read_to_string(dir.path().join(".catcombo/metadata.jsonl")).unwrap();

        Project::init(dir.path()).unwrap();
        let second = fs::read_to_string(dir.path().join(".catcombo/metadata.jsonl")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn default_config_file_parses() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().project, Default::default());
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn service_uses_project_limits() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();
        fs::write(
            dir.path().join(PROJECT_DIR).join("config.toml"),
            "[limits]\nmax_combinations = 12\n",
        )
        .unwrap();

        let project = Project::init(dir.path()).unwrap();
        let service = project.service().unwrap();

        assert_eq!(service.limits().max_combinations, 12);
    }
}
