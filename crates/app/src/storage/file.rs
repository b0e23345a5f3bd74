//! JSON file store

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Store backed by a single JSON object on disk. Every mutation is written through.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<FxHashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => FxHashMap::default(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(error) if error.kind() == ErrorKind::NotFound => FxHashMap::default(),
            Err(error) => return Err(error.into()),
        };

        debug!(path = %path.display(), keys = values.len(), "opened local storage");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &FxHashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        values.insert(key.to_string(), value.to_string());

        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        if values.remove(key).is_none() {
            return Ok(());
        }

        self.persist(&values)
    }
}
