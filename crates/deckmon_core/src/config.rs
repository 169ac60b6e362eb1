//! Engine configuration.
//!
//! Stored as TOML. Every field has a default, so an empty file (or no file at
//! all) yields a working configuration for a stock Steam Deck:
//!
//! ```toml
//! steam_roots = ["/home/deck/.local/share/Steam"]
//! extra_library_roots = ["/run/media/mmcblk0p1/steamapps"]
//!
//! [online]
//! enabled = true
//! timeout_secs = 5
//!
//! [scanner]
//! ignore_markers = ["steamwebhelper", "gamescope"]
//! ```

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use directories_next::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

/// File name of the title cache inside the cache directory.
pub const CACHE_FILE_NAME: &str = "game_cache.json";

/// File name of the audit log inside the cache directory.
pub const AUDIT_LOG_FILE_NAME: &str = "deckmon.log";

/// File name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "deckmon")
}

fn utf8(path: &std::path::Path) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).ok()
}

/// Default config file location (`~/.config/deckmon/config.toml` on Linux).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let dirs = project_dirs()?;
    utf8(dirs.config_dir()).map(|d| d.join(CONFIG_FILE_NAME))
}

/// Default directory for the cache and audit log (`~/.cache/deckmon`).
pub fn default_cache_dir() -> Utf8PathBuf {
    project_dirs()
        .and_then(|d| utf8(d.cache_dir()))
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Standard Steam install locations on Linux.
pub fn default_steam_roots() -> Vec<Utf8PathBuf> {
    let Some(home) = BaseDirs::new().and_then(|b| utf8(b.home_dir())) else {
        return Vec::new();
    };
    vec![
        home.join(".local").join("share").join("Steam"),
        home.join(".steam").join("steam"),
    ]
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Settings for the online title lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineConfig {
    pub enabled: bool,
    pub app_details_url: String,
    pub store_search_url: String,
    pub secondary_search_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Store country code sent with Steam store queries.
    pub country: String,
    /// Store language sent with Steam store queries.
    pub language: String,
}

impl Default for OnlineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_details_url: "https://store.steampowered.com/api/appdetails".to_string(),
            store_search_url: "https://store.steampowered.com/api/storesearch/".to_string(),
            secondary_search_url: "https://www.cheapshark.com/api/1.0/games".to_string(),
            timeout_secs: 5,
            country: "US".to_string(),
            language: "english".to_string(),
        }
    }
}

/// Word lists driving process classification.
///
/// All matching is case-insensitive; entries are lowercased when the scanner
/// compiles them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerRules {
    /// Substrings marking a command line as not a game.
    pub ignore_markers: Vec<String>,
    /// Build/binary folders skipped when picking a game folder from a path.
    pub technical_folders: Vec<String>,
    /// Container folders skipped when picking a game folder from a path.
    pub skip_folders: Vec<String>,
    /// Substrings marking a command line as a game invocation for the path
    /// fallback.
    pub game_path_markers: Vec<String>,
    /// Folder segment that holds ROMs (`.../roms/<system>/<file>`).
    pub rom_folder: String,
    pub rom_extensions: Vec<String>,
    /// Folder segment of the DOS game library.
    pub dos_library_folder: String,
    pub dos_script_extensions: Vec<String>,
    /// Names of the DOS library's own frontend, never reported as a game.
    pub dos_frontend_names: Vec<String>,
    /// Process names of the launch wrapper that carries `AppId=<id>`.
    pub launch_wrappers: Vec<String>,
    /// Shortest folder name accepted by the path fallback.
    pub min_folder_len: usize,
}

impl Default for ScannerRules {
    fn default() -> Self {
        Self {
            ignore_markers: strings(&[
                "steam.exe",
                "steamwebhelper",
                "steamerrorreporter",
                "gameoverlayui",
                "services.exe",
                "explorer.exe",
                "winedevice.exe",
                "plugplay.exe",
                "rpcss.exe",
                "svchost.exe",
                "tabtip.exe",
                "conhost.exe",
                "system32",
                "pressure-vessel",
                "steam-runtime",
                "steamlinuxruntime",
                "proton",
                "experimental",
                "gamescope",
                "mangoapp",
                "epicgameslauncher",
                "monitoring",
                "bmlauncher",
                "launcher",
                "setup.exe",
                "install.exe",
                "unins000.exe",
                "reaper",
                "easyanticheat",
                "battleye",
                "crashhandler",
                "crashreport",
                "plasmashell",
                "kwin_",
                "xdg-desktop-portal",
                "deckmon",
            ]),
            technical_folders: strings(&[
                "binaries",
                "win64",
                "win32",
                "x64",
                "x86",
                "x86_64",
                "amd64",
                "i386",
                "bin",
                "bin64",
                "bin32",
                "shipping",
                "pfx",
                "drive_c",
                "core",
                "engine",
                "ubuntu12_32",
                "ubuntu12_64",
                "linux64",
                "linux32",
            ]),
            skip_folders: strings(&[
                "windows",
                "common",
                "steamapps",
                "steam",
                "games",
                "program files",
                "program files (x86)",
                "users",
                "home",
                "deck",
                "mnt",
                "media",
                "run",
                "opt",
                "usr",
                "local",
                "share",
                "lib",
                "lib64",
                "compatdata",
            ]),
            game_path_markers: strings(&["/steamapps/common/", "\\steamapps\\common\\", ".exe", "/games/"]),
            rom_folder: "roms".to_string(),
            rom_extensions: strings(&[
                "iso", "gcm", "rvz", "wbfs", "zip", "7z", "chd", "cue", "bin", "elf", "nsp", "xci",
                "wua", "wux", "nes", "sfc", "smc", "n64", "z64", "v64", "gba", "gbc", "gb", "nds",
                "3ds", "cia", "md", "gen", "sms", "gg", "pce", "psp", "cso", "pbp",
            ]),
            dos_library_folder: "eXoDOS".to_string(),
            dos_script_extensions: strings(&["command", "bsh"]),
            dos_frontend_names: strings(&["exogui", "exodos", "launch", "install", "setup"]),
            launch_wrappers: strings(&["reaper"]),
            min_folder_len: 3,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Steam installation roots (the directories holding `steamapps/`).
    pub steam_roots: Vec<Utf8PathBuf>,
    /// Library roots (`.../steamapps`) not listed in `libraryfolders.vdf`.
    pub extra_library_roots: Vec<Utf8PathBuf>,
    /// Title cache location; defaults to the cache directory.
    pub cache_path: Option<Utf8PathBuf>,
    /// Title cache backup; defaults to `<cache_path>.bak`.
    pub cache_backup_path: Option<Utf8PathBuf>,
    /// Audit log location; defaults to the cache directory.
    pub audit_log_path: Option<Utf8PathBuf>,
    pub online: OnlineConfig,
    pub scanner: ScannerRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            steam_roots: default_steam_roots(),
            extra_library_roots: Vec::new(),
            cache_path: None,
            cache_backup_path: None,
            audit_log_path: None,
            online: OnlineConfig::default(),
            scanner: ScannerRules::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML config file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_std_path())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self> {
        if path.as_std_path().exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Writes the config as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_std_path(), content)?;
        Ok(())
    }

    pub fn cache_path(&self) -> Utf8PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| default_cache_dir().join(CACHE_FILE_NAME))
    }

    pub fn cache_backup_path(&self) -> Utf8PathBuf {
        self.cache_backup_path
            .clone()
            .unwrap_or_else(|| crate::cache::default_backup_path(&self.cache_path()))
    }

    pub fn audit_log_path(&self) -> Utf8PathBuf {
        self.audit_log_path
            .clone()
            .unwrap_or_else(|| default_cache_dir().join(AUDIT_LOG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let cfg = EngineConfig::from_toml("").unwrap();
        assert_eq!(cfg.online, OnlineConfig::default());
        assert_eq!(cfg.scanner, ScannerRules::default());
        assert!(cfg.cache_path.is_none());
    }

    #[test]
    fn test_partial_tables_keep_defaults() {
        let cfg = EngineConfig::from_toml(
            r#"
            cache_path = "/tmp/deckmon/cache.json"

            [online]
            enabled = false

            [scanner]
            ignore_markers = ["mytool"]
            "#,
        )
        .unwrap();

        assert!(!cfg.online.enabled);
        assert_eq!(cfg.online.timeout_secs, 5);
        assert_eq!(cfg.scanner.ignore_markers, vec!["mytool".to_string()]);
        assert_eq!(cfg.scanner.rom_folder, "roms");
        assert_eq!(cfg.cache_path(), Utf8PathBuf::from("/tmp/deckmon/cache.json"));
        assert_eq!(
            cfg.cache_backup_path(),
            Utf8PathBuf::from("/tmp/deckmon/cache.json.bak")
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(EngineConfig::from_toml("steam_roots = 5").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("nested/config.toml");

        let mut cfg = EngineConfig::default();
        cfg.steam_roots = vec![Utf8PathBuf::from("/home/deck/.local/share/Steam")];
        cfg.online.country = "NL".to_string();
        cfg.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("absent.toml");
        let cfg = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(cfg.scanner, ScannerRules::default());
    }
}
