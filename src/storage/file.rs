//! File-Backed Store
//!
//! Durable key-value store persisting its whole key space as a single JSON
//! document so cached entries survive process restarts.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, StorageError};
use crate::storage::{used_bytes, KeyValueStore};

// == File Store ==
/// Key-value store mirrored to a JSON file on every mutation.
#[derive(Debug)]
pub struct FileStore {
    /// Backing file
    path: PathBuf,
    /// In-memory view of the file contents
    items: BTreeMap<String, String>,
    /// Optional byte quota over all keys and values
    quota_bytes: Option<usize>,
}

impl FileStore {
    // == Open ==
    /// Opens the store at `path`, loading existing contents.
    ///
    /// A missing file yields an empty store; the file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!("Opened file store {} with {} keys", path.display(), items.len());

        Ok(Self {
            path,
            items,
            quota_bytes: None,
        })
    }

    /// Opens the store at `path`, setting an unparseable file aside.
    ///
    /// A file that is not a JSON object of strings is renamed to
    /// `<path>.corrupt` and the store starts empty. I/O errors still fail.
    pub fn open_or_recover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Err(StorageError::Serialization(err)) => {
                let mut aside = path.to_path_buf().into_os_string();
                aside.push(".corrupt");
                let aside = PathBuf::from(aside);
                warn!(
                    "Cache store {} is corrupt ({}), moving it to {}",
                    path.display(),
                    err,
                    aside.display()
                );
                fs::rename(path, &aside)?;
                Self::open(path)
            }
            result => result,
        }
    }

    /// Sets a byte quota; writes that would exceed it fail.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Persist ==
    /// Writes the key space to a sibling temp file, then renames it over the target.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_string(&self.items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let others = used_bytes(self.items.iter().filter(|(k, _)| k.as_str() != key));
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        let previous = self.items.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist() {
            // Keep memory consistent with what is on disk
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let Some(old) = self.items.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.persist() {
            self.items.insert(key.to_string(), old);
            return Err(err);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.items.len())
    }
}
