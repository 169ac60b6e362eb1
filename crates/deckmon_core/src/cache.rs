//! Persistent raw-name -> display-title cache.
//!
//! The cache is a flat JSON object stored at a fixed path, with one rolling
//! backup next to it:
//!
//! ```json
//! {
//!   "620": "Portal 2",
//!   "HollowKnight": "Hollow Knight"
//! }
//! ```
//!
//! Loading never fails: an unreadable or corrupt primary falls back to the
//! backup, and a bad backup falls back to an empty cache. Flushing copies the
//! current (valid) primary to the backup, writes the merged map to a temporary
//! file in the same directory and renames it over the primary, so the primary
//! path only ever holds a complete document.
//!
//! Entries never expire. The read-modify-write cycle is not safe for
//! concurrent writers; callers run one detection cycle at a time.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

/// Suffix appended to the primary path to form the default backup path.
pub const BACKUP_SUFFIX: &str = "bak";

#[derive(Debug)]
pub struct TitleCache {
    path: Utf8PathBuf,
    backup_path: Utf8PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

/// Reads and parses a cache document.
fn read_map(path: &Utf8Path) -> Result<BTreeMap<String, String>> {
    let contents = std::fs::read_to_string(path.as_std_path())?;
    let map = serde_json::from_str(&contents)?;
    Ok(map)
}

/// Default backup location for a primary cache path (`<path>.bak`).
pub fn default_backup_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut backup = path.as_str().to_string();
    backup.push('.');
    backup.push_str(BACKUP_SUFFIX);
    Utf8PathBuf::from(backup)
}

impl TitleCache {
    /// Loads the cache, falling back to the backup and then to empty.
    pub fn load(path: impl Into<Utf8PathBuf>, backup_path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let backup_path = backup_path.into();

        let entries = match read_map(&path) {
            Ok(map) => map,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No title cache at {}, trying backup", path);
                Self::load_backup(&backup_path)
            }
            Err(e) => {
                tracing::warn!("Title cache {} is unusable ({}), trying backup", path, e);
                Self::load_backup(&backup_path)
            }
        };

        Self {
            path,
            backup_path,
            entries,
            dirty: false,
        }
    }

    /// Loads the cache from `path` with the default `<path>.bak` backup.
    pub fn load_default(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let backup = default_backup_path(&path);
        Self::load(path, backup)
    }

    fn load_backup(backup_path: &Utf8Path) -> BTreeMap<String, String> {
        match read_map(backup_path) {
            Ok(map) => {
                tracing::info!("Recovered {} titles from backup {}", map.len(), backup_path);
                map
            }
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Title cache backup {} is unusable ({}), starting cold", backup_path, e);
                BTreeMap::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn put(&mut self, key: impl Into<String>, title: impl Into<String>) {
        let key = key.into();
        let title = title.into();
        if self.entries.get(&key) != Some(&title) {
            self.entries.insert(key, title);
            self.dirty = true;
        }
    }

    /// Writes pending changes to disk. Does nothing when nothing changed.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        self.backup_primary()?;
        let temp = self.write_temp()?;
        temp.persist(self.path.as_std_path())
            .map_err(|e| Error::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;

        self.dirty = false;
        tracing::debug!("Flushed {} titles to {}", self.entries.len(), self.path);
        Ok(())
    }

    /// Copies the current primary to the backup path, if it is a valid cache.
    ///
    /// A corrupt primary is never copied so it cannot clobber a good backup.
    fn backup_primary(&self) -> Result<()> {
        if !self.path.as_std_path().exists() {
            return Ok(());
        }
        if let Err(e) = read_map(&self.path) {
            tracing::warn!("Not backing up unusable title cache {}: {}", self.path, e);
            return Ok(());
        }
        std::fs::copy(self.path.as_std_path(), self.backup_path.as_std_path())?;
        Ok(())
    }

    /// Writes the full map to a synced temporary file beside the primary.
    pub(crate) fn write_temp(&self) -> Result<NamedTempFile> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        std::fs::create_dir_all(dir.as_std_path())?;

        let mut temp = NamedTempFile::new_in(dir.as_std_path())?;
        serde_json::to_writer_pretty(&mut temp, &self.entries)?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        Ok(temp)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
