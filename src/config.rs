use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::{schema, MigrationPolicy};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BookstoreConfig {
    /// Database file; relative paths resolve against the working directory
    pub database: Option<String>,
    /// Explicit choice for schema upgrades. Unset means drop-and-recreate.
    pub migration: Option<MigrationPolicy>,
}

impl BookstoreConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(Path::new(".")))
    }

    pub fn migration_policy(&self) -> MigrationPolicy {
        self.migration.unwrap_or_default()
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("bookstore.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".bookstore").join(schema::DATABASE_NAME)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BookstoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BookstoreConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BookstoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
