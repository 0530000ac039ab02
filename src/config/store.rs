use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::FactStore;

/// Where the fact store lives. Loaded from a TOML file such as:
///
/// ```toml
/// data_dir = "/var/lib/papershelf"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub const DB_FILE: &'static str = "papershelf.db";

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(Self::DB_FILE)
    }

    /// Opens the store and makes sure its schema exists.
    pub fn open_store(&self) -> Result<FactStore> {
        let store = FactStore::open(self.db_path())?;
        store.initialize()?;
        Ok(store)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("papershelf.toml");
        fs::write(&path, "data_dir = \"/srv/papers\"\n").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.db_path(), PathBuf::from("/srv/papers/papershelf.db"));
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("papershelf.toml");
        fs::write(&path, "").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("papershelf.toml");
        fs::write(&path, "data_dir = 12").unwrap();

        assert!(matches!(StoreConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_open_store_initializes_schema() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig {
            data_dir: temp.path().to_path_buf(),
        };

        let store = config.open_store().unwrap();
        assert_eq!(store.count_facts().unwrap(), 0);
        assert!(config.db_path().exists());
    }
}
