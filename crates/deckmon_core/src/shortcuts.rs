//! Non-Steam shortcut catalogue built from `shortcuts.vdf`.
//!
//! Each Steam profile keeps its user-added shortcuts in a binary key-value
//! file. Records are tagged by a leading type byte:
//!
//! | Tag    | Layout                                        |
//! |--------|-----------------------------------------------|
//! | `0x01` | string field: `name\0value\0`                 |
//! | `0x02` | int32 field: `name\0` + 4 bytes little-endian |
//! | other  | object open/close markers, skipped            |
//!
//! Only the flat field stream matters here. The object nesting is not
//! modeled; the scanner walks byte by byte and reacts to the two field tags.
//! A shortcut's runtime id is its `appid` field with the high bit set, which
//! is what Steam passes to the launched process.

use crate::appid::shortcut_runtime_id;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

const TAG_STRING: u8 = 0x01;
const TAG_INT32: u8 = 0x02;

/// One shortcut with a known display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutEntry {
    /// Runtime id as a decimal string, when an `appid` field preceded the name.
    pub runtime_id: Option<String>,
    pub name: String,
}

/// Lookup from shortcut runtime id or lowercased name to display name.
#[derive(Debug, Clone, Default)]
pub struct ShortcutIndex {
    by_runtime_id: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

/// Reads a NUL-terminated byte string starting at `start`.
///
/// Returns the string and the offset just past the terminator.
fn read_cstr(data: &[u8], start: usize) -> Result<(String, usize)> {
    let rest = data
        .get(start..)
        .ok_or(Error::TruncatedShortcuts { offset: start })?;
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::TruncatedShortcuts { offset: start })?;
    let s = String::from_utf8_lossy(&rest[..len]).into_owned();
    Ok((s, start + len + 1))
}

/// Walks the field stream of one shortcut registry, pushing entries as they
/// are found.
///
/// An `appid` int field sets the current runtime id; every non-empty
/// `appname` string field yields an entry tagged with it. On truncation the
/// entries read so far stay in `entries`.
fn scan_fields(data: &[u8], entries: &mut Vec<ShortcutEntry>) -> Result<()> {
    let mut current_id: Option<String> = None;
    let mut pos = 0;

    while pos < data.len() {
        match data[pos] {
            TAG_INT32 => {
                let (name, value_start) = read_cstr(data, pos + 1)?;
                let bytes = data
                    .get(value_start..value_start + 4)
                    .ok_or(Error::TruncatedShortcuts {
                        offset: value_start,
                    })?;
                let value = LittleEndian::read_u32(bytes);
                if name.eq_ignore_ascii_case("appid") {
                    current_id = Some(shortcut_runtime_id(value).to_string());
                }
                pos = value_start + 4;
            }
            TAG_STRING => {
                let (name, value_start) = read_cstr(data, pos + 1)?;
                let (value, next) = read_cstr(data, value_start)?;
                if name.eq_ignore_ascii_case("appname") {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        entries.push(ShortcutEntry {
                            runtime_id: current_id.clone(),
                            name: trimmed.to_string(),
                        });
                    }
                }
                pos = next;
            }
            _ => pos += 1,
        }
    }

    Ok(())
}

/// Parses one shortcut registry, failing on any truncated record.
pub fn parse_shortcuts(data: &[u8]) -> Result<Vec<ShortcutEntry>> {
    let mut entries = Vec::new();
    scan_fields(data, &mut entries)?;
    Ok(entries)
}

impl ShortcutIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every registry file in order. Later files win on collisions.
    ///
    /// A file that cannot be read or parsed is logged and skipped.
    pub fn build(files: &[Utf8PathBuf]) -> Self {
        let mut index = Self::new();
        for file in files {
            match index.add_from_file(file) {
                Ok(count) => tracing::debug!("Indexed {} shortcuts from {}", count, file),
                Err(e) => tracing::warn!("Skipping shortcut registry {}: {}", file, e),
            }
        }
        tracing::info!(
            "Shortcut index built: {} runtime ids, {} names",
            index.by_runtime_id.len(),
            index.by_name.len()
        );
        index
    }

    /// Parses one registry file and merges its entries.
    ///
    /// A truncated registry still contributes the shortcuts before the
    /// damaged record.
    pub fn add_from_file(&mut self, path: &Utf8Path) -> Result<usize> {
        let data = std::fs::read(path.as_std_path())?;
        let mut entries = Vec::new();
        if let Err(e) = scan_fields(&data, &mut entries) {
            tracing::warn!(
                "Shortcut registry {} is damaged, keeping {} shortcuts: {}",
                path,
                entries.len(),
                e
            );
        }
        let count = entries.len();
        for entry in entries {
            self.insert(entry);
        }
        Ok(count)
    }

    pub fn insert(&mut self, entry: ShortcutEntry) {
        if let Some(id) = entry.runtime_id {
            self.by_runtime_id.insert(id, entry.name.clone());
        }
        self.by_name.insert(entry.name.to_lowercase(), entry.name);
    }

    pub fn title_for_id(&self, runtime_id: &str) -> Option<&str> {
        self.by_runtime_id.get(runtime_id).map(String::as_str)
    }

    /// Looks up a shortcut by display name, case-insensitively.
    pub fn title_for_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Iterates over `(runtime id, title)` pairs.
    pub fn titles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_runtime_id
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Number of shortcuts known by runtime id.
    pub fn len(&self) -> usize {
        self.by_runtime_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_runtime_id.is_empty() && self.by_name.is_empty()
    }
}
