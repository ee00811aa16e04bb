//! Flat-file persistence for items and rating events
//!
//! Two JSON arrays live in the data directory: `items.json` and
//! `ratings.json`. Every write replaces a whole file. [`ContentStore::commit`]
//! writes both files so that either both updates land or neither does.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{Item, RatingEvent};
use crate::{Error, Result};

pub const ITEMS_FILE: &str = "items.json";
pub const RATINGS_FILE: &str = "ratings.json";

/// Read/write access to the item store and the rating ledger file
///
/// All operations are synchronous; callers on an async runtime should run
/// them on a blocking thread.
pub trait ContentStore: Send + Sync {
    fn read_items(&self) -> Result<Vec<Item>>;

    fn write_items(&self, items: &[Item]) -> Result<()>;

    fn read_ratings(&self) -> Result<Vec<RatingEvent>>;

    fn write_ratings(&self, ratings: &[RatingEvent]) -> Result<()>;

    /// Persist items and ratings together
    ///
    /// The default writes ratings first, then items. Implementations that can
    /// do better (all-or-nothing) override it.
    fn commit(&self, items: &[Item], ratings: &[RatingEvent]) -> Result<()> {
        self.write_ratings(ratings)?;
        self.write_items(items)
    }
}

/// JSON files in a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join(ITEMS_FILE)
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.data_dir.join(RATINGS_FILE)
    }

    /// Create the data directory if it does not exist yet
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
            debug!(path = %self.data_dir.display(), "Created data directory");
        }
        Ok(())
    }
}

impl ContentStore for JsonFileStore {
    fn read_items(&self) -> Result<Vec<Item>> {
        read_json_array(&self.items_path())
    }

    fn write_items(&self, items: &[Item]) -> Result<()> {
        self.ensure_data_dir()?;
        write_files_atomically(&[(self.items_path(), encode(items)?)])
    }

    fn read_ratings(&self) -> Result<Vec<RatingEvent>> {
        read_json_array(&self.ratings_path())
    }

    fn write_ratings(&self, ratings: &[RatingEvent]) -> Result<()> {
        self.ensure_data_dir()?;
        write_files_atomically(&[(self.ratings_path(), encode(ratings)?)])
    }

    fn commit(&self, items: &[Item], ratings: &[RatingEvent]) -> Result<()> {
        self.ensure_data_dir()?;
        write_files_atomically(&[
            (self.items_path(), encode(items)?),
            (self.ratings_path(), encode(ratings)?),
        ])
    }
}

/// Missing file reads as an empty list; unreadable or corrupt files are errors
fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            if content.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(serde_json::from_str(&content)?)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::Io(e)),
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Replace a set of files so that all of them change or none do
///
/// 1. Write every payload to `<file>.tmp`.
/// 2. Copy each existing original to `<file>.backup`.
/// 3. Rename temps over originals.
/// 4. Remove backups.
///
/// On failure, originals are restored from their backups (or removed if they
/// did not exist before) and temps are deleted.
fn write_files_atomically(files: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut temps: Vec<PathBuf> = Vec::with_capacity(files.len());
    let mut backups: Vec<Option<PathBuf>> = Vec::with_capacity(files.len());
    let mut replaced = 0usize;

    let outcome = (|| -> Result<()> {
        for (path, bytes) in files {
            let tmp = sibling(path, ".tmp");
            fs::write(&tmp, bytes)?;
            temps.push(tmp);
        }

        for (path, _) in files {
            if path.exists() {
                let backup = sibling(path, ".backup");
                fs::copy(path, &backup)?;
                backups.push(Some(backup));
            } else {
                backups.push(None);
            }
        }

        for ((path, _), tmp) in files.iter().zip(&temps) {
            fs::rename(tmp, path)?;
            replaced += 1;
        }
        Ok(())
    })();

    match outcome {
        Ok(()) => {
            for backup in backups.into_iter().flatten() {
                remove_logged(&backup);
            }
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Multi-file write failed, rolling back");
            for (idx, (path, _)) in files.iter().enumerate().take(replaced) {
                match backups.get(idx) {
                    Some(Some(backup)) => {
                        if let Err(err) = fs::rename(backup, path) {
                            warn!(
                                path = %path.display(),
                                error = %err,
                                "Failed to restore original from backup"
                            );
                        }
                    }
                    Some(None) => remove_logged(path),
                    None => {}
                }
            }
            for backup in backups.iter().skip(replaced).flatten() {
                remove_logged(backup);
            }
            for tmp in &temps {
                remove_logged(tmp);
            }
            Err(e)
        }
    }
}

/// Best-effort removal; a missing file is fine, anything else is logged
fn remove_logged(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}

/// In-process store, used by tests and tools that stage data before writing
///
/// `fail_writes` makes every write return an I/O error without changing the
/// held data.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: Mutex<Vec<Item>>,
    ratings: Mutex<Vec<RatingEvent>>,
    fail_writes: bool,
}

impl InMemoryStore {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            ratings: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        Ok(())
    }
}

impl ContentStore for InMemoryStore {
    fn read_items(&self) -> Result<Vec<Item>> {
        let items = self
            .items
            .lock()
            .map_err(|_| Error::Internal("item store lock poisoned".to_string()))?;
        Ok(items.clone())
    }

    fn write_items(&self, items: &[Item]) -> Result<()> {
        self.check_writable()?;
        let mut held = self
            .items
            .lock()
            .map_err(|_| Error::Internal("item store lock poisoned".to_string()))?;
        *held = items.to_vec();
        Ok(())
    }

    fn read_ratings(&self) -> Result<Vec<RatingEvent>> {
        let ratings = self
            .ratings
            .lock()
            .map_err(|_| Error::Internal("rating store lock poisoned".to_string()))?;
        Ok(ratings.clone())
    }

    fn write_ratings(&self, ratings: &[RatingEvent]) -> Result<()> {
        self.check_writable()?;
        let mut held = self
            .ratings
            .lock()
            .map_err(|_| Error::Internal("rating store lock poisoned".to_string()))?;
        *held = ratings.to_vec();
        Ok(())
    }
}
