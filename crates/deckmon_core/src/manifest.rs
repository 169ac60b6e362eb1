//! Installed-title catalogue built from Steam app manifests.
//!
//! Every library root (`.../steamapps`) holds one `appmanifest_<appid>.acf`
//! per installed title. The files use a `"key" "value"` text grammar; only
//! three keys matter here:
//!
//! ```text
//! "AppState"
//! {
//!     "appid"       "620"
//!     "name"        "Portal 2"
//!     "installdir"  "Portal 2"
//! }
//! ```
//!
//! The [`ManifestIndex`] is built once and is read-only afterwards. Missing
//! roots and unreadable or incomplete manifests are skipped.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use walkdir::WalkDir;

/// File extension of app manifests.
pub const MANIFEST_EXTENSION: &str = "acf";

/// One parsed app manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub app_id: String,
    pub name: String,
    pub install_dir: Option<String>,
}

/// Lookup from app id and install folder to display title.
#[derive(Debug, Clone, Default)]
pub struct ManifestIndex {
    /// App id -> display name.
    by_app_id: HashMap<String, String>,
    /// Lowercased install folder -> manifest.
    by_folder: HashMap<String, ManifestEntry>,
}

fn key_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)"\s+"((?:[^"\\]|\\.)*)""#).unwrap())
}

/// Every `"key" "value"` pair in a text key-value document, in file order.
///
/// Nested object headers (`"AppState" {`) are not pairs and are skipped.
pub(crate) fn key_value_pairs(content: &str) -> impl Iterator<Item = (String, String)> + '_ {
    key_value_regex().captures_iter(content).map(|caps| {
        let value = caps[2].replace("\\\\", "\\").replace("\\\"", "\"");
        (caps[1].to_string(), value)
    })
}

/// Extracts `appid`, `name` and `installdir` from manifest text.
///
/// Keys are matched case-insensitively and the last occurrence wins. Returns
/// `None` when the app id is not numeric or the name is empty.
pub fn parse_manifest(content: &str) -> Option<ManifestEntry> {
    let mut app_id = None;
    let mut name = None;
    let mut install_dir = None;

    for (key, value) in key_value_pairs(content) {
        match key.to_ascii_lowercase().as_str() {
            "appid" => app_id = Some(value),
            "name" => name = Some(value),
            "installdir" => install_dir = Some(value),
            _ => {}
        }
    }

    let app_id = app_id?.trim().to_string();
    if app_id.is_empty() || !app_id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let name = name?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let install_dir = install_dir
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Some(ManifestEntry {
        app_id,
        name,
        install_dir,
    })
}

impl ManifestIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every library root for manifests and indexes them.
    pub fn build(roots: &[Utf8PathBuf]) -> Self {
        let mut index = Self::new();
        for root in roots {
            index.add_from_dir(root);
        }
        tracing::info!(
            "Manifest index built: {} app ids, {} install folders",
            index.by_app_id.len(),
            index.by_folder.len()
        );
        index
    }

    /// Indexes the manifests directly inside `root`.
    pub fn add_from_dir(&mut self, root: &Utf8Path) {
        if !root.as_std_path().is_dir() {
            tracing::debug!("Skipping missing library root {}", root);
            return;
        }

        for entry in WalkDir::new(root.as_std_path())
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let is_manifest = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(MANIFEST_EXTENSION));
            if !is_manifest {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(c) => c,
                Err(e) => {
                    tracing::debug!("Skipping unreadable manifest {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            match parse_manifest(&content) {
                Some(manifest) => self.insert(manifest),
                None => tracing::debug!("Skipping incomplete manifest {}", entry.path().display()),
            }
        }
    }

    /// Adds one manifest, replacing earlier entries with the same keys.
    pub fn insert(&mut self, entry: ManifestEntry) {
        self.by_app_id
            .insert(entry.app_id.clone(), entry.name.clone());
        if let Some(dir) = &entry.install_dir {
            self.by_folder.insert(dir.to_lowercase(), entry);
        }
    }

    pub fn title_for_app_id(&self, app_id: &str) -> Option<&str> {
        self.by_app_id.get(app_id).map(String::as_str)
    }

    /// Looks up an install folder case-insensitively.
    pub fn entry_for_folder(&self, folder: &str) -> Option<&ManifestEntry> {
        self.by_folder.get(&folder.to_lowercase())
    }

    pub fn title_for_folder(&self, folder: &str) -> Option<&str> {
        self.entry_for_folder(folder).map(|e| e.name.as_str())
    }

    /// Iterates over `(app id, title)` pairs.
    pub fn titles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_app_id
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_app_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_app_id.is_empty()
    }
}
