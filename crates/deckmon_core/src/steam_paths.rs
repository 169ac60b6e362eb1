//! Steam installation layout discovery.
//!
//! From a set of Steam roots this finds:
//! 1. library roots: `<root>/steamapps` plus every `"path"` listed in
//!    `libraryfolders.vdf` (SD cards, extra drives)
//! 2. shortcut registries: `<root>/userdata/<profile>/config/shortcuts.vdf`
//!
//! `~/.steam/steam` is usually a symlink to `~/.local/share/Steam`, so paths
//! are de-duplicated by their canonical form.

use crate::manifest::key_value_pairs;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;

/// Pushes `path` unless it is missing or an alias of something already seen.
fn push_unique(out: &mut Vec<Utf8PathBuf>, seen: &mut HashSet<std::path::PathBuf>, path: Utf8PathBuf) {
    let Ok(canonical) = std::fs::canonicalize(path.as_std_path()) else {
        return;
    };
    if seen.insert(canonical) {
        out.push(path);
    }
}

/// Library paths listed in a `libraryfolders.vdf` document.
pub fn parse_library_folders(content: &str) -> Vec<Utf8PathBuf> {
    key_value_pairs(content)
        .filter(|(key, value)| key.eq_ignore_ascii_case("path") && !value.trim().is_empty())
        .map(|(_, value)| Utf8PathBuf::from(value.trim()))
        .collect()
}

/// All existing library roots (`.../steamapps` directories).
pub fn library_roots(steam_roots: &[Utf8PathBuf], extra: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let mut roots = Vec::new();
    let mut seen = HashSet::new();

    for steam_root in steam_roots {
        let steamapps = steam_root.join("steamapps");
        push_unique(&mut roots, &mut seen, steamapps.clone());

        for vdf in [
            steamapps.join("libraryfolders.vdf"),
            steam_root.join("config").join("libraryfolders.vdf"),
        ] {
            let Ok(content) = std::fs::read_to_string(vdf.as_std_path()) else {
                continue;
            };
            for library in parse_library_folders(&content) {
                push_unique(&mut roots, &mut seen, library.join("steamapps"));
            }
        }
    }

    for root in extra {
        push_unique(&mut roots, &mut seen, root.clone());
    }

    tracing::debug!("Library roots: {:?}", roots);
    roots
}

/// All existing per-profile shortcut registries, in a stable order.
pub fn shortcut_files(steam_roots: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for steam_root in steam_roots {
        let userdata = steam_root.join("userdata");
        let Ok(profiles) = std::fs::read_dir(userdata.as_std_path()) else {
            continue;
        };

        let mut candidates: Vec<Utf8PathBuf> = profiles
            .filter_map(|e| e.ok())
            .filter_map(|e| Utf8PathBuf::from_path_buf(e.path()).ok())
            .map(|profile| profile.join("config").join("shortcuts.vdf"))
            .filter(|p| p.as_std_path().is_file())
            .collect();
        candidates.sort();

        for file in candidates {
            push_unique(&mut files, &mut seen, file);
        }
    }

    files
}

/// Returns `true` if `path` looks like a Steam root.
pub fn is_steam_root(path: &Utf8Path) -> bool {
    path.join("steamapps").as_std_path().is_dir()
}
