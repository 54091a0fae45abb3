use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::StorageError;

const STATE_FILE: &str = "local_storage.json";

#[derive(Clone, Debug)]
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    /// Create a new storage instance with the default base directory ("./.ledger")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./.ledger"),
        }
    }

    /// Create storage with custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the base directory path
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn state_file(&self) -> PathBuf {
        self.base_path.join(STATE_FILE)
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let path = self.state_file();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(path)?;
        let values = serde_json::from_str(&contents)?;
        Ok(values)
    }

    fn save_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)?;
        let json = serde_json::to_string_pretty(values)?;
        fs::write(self.state_file(), json)?;
        Ok(())
    }

    /// Read a value; `None` if it was never written
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load_all()?.remove(key))
    }

    /// Write a value, replacing any previous one
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.load_all()?;
        values.insert(key.to_string(), value.to_string());
        self.save_all(&values)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.load_all()?;
        if values.remove(key).is_some() {
            self.save_all(&values)?;
        }
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
