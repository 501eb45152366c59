use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::Catalog;

const APP_NAME: &str = "feature-planner";
const CONFIG_FILE: &str = "config.json";

pub const CATALOG_ENV: &str = "FEATURE_PLANNER_CATALOG";
pub const DATABASE_ENV: &str = "FEATURE_PLANNER_DB";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerConfig {
    /// JSON catalog to load. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// SQLite file for submitted plans. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl PlannerConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides. Falls back to defaults if the file is missing
    /// or fails to parse.
    pub fn load() -> Self {
        let base = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        base.with_overrides(
            std::env::var_os(CATALOG_ENV).map(PathBuf::from),
            std::env::var_os(DATABASE_ENV).map(PathBuf::from),
        )
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Replace file values with explicitly supplied ones.
    pub fn with_overrides(mut self, catalog: Option<PathBuf>, database: Option<PathBuf>) -> Self {
        if catalog.is_some() {
            self.catalog_path = catalog;
        }
        if database.is_some() {
            self.database_path = database;
        }
        self
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read catalog {}", path.display()))?;
                Catalog::from_json(&json)
                    .with_context(|| format!("Invalid catalog {}", path.display()))
            }
            None => Catalog::builtin().context("Built-in catalog is invalid"),
        }
    }

    pub fn open_database(&self) -> Result<Database> {
        let db = match &self.database_path {
            Some(path) => Database::open(path.clone())?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PlannerConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = PlannerConfig {
            catalog_path: Some("/srv/catalog.json".into()),
            database_path: None,
        };

        config.save_to(&path).unwrap();

        assert_eq!(PlannerConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert!(PlannerConfig::load_from(&path).is_err());
    }

    #[test]
    fn overrides_replace_only_supplied_values() {
        let config = PlannerConfig {
            catalog_path: Some("a.json".into()),
            database_path: Some("a.db".into()),
        }
        .with_overrides(None, Some("b.db".into()));

        assert_eq!(config.catalog_path, Some(PathBuf::from("a.json")));
        assert_eq!(config.database_path, Some(PathBuf::from("b.db")));
    }

    #[test]
    fn catalog_falls_back_to_builtin() {
        let catalog = PlannerConfig::default().load_catalog().unwrap();
        assert!(!catalog.features().is_empty());
    }

    #[test]
    fn database_path_is_honoured() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plans.db");
        let config = PlannerConfig {
            catalog_path: None,
            database_path: Some(path.clone()),
        };

        config.open_database().unwrap();

        assert!(path.exists());
    }
}
