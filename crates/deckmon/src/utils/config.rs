//! Locating and loading the engine configuration.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use deckmon_core::config::default_config_path;
use deckmon_core::EngineConfig;

/// The config file to use: `--config` if given, otherwise the per-user default.
pub fn config_path(explicit: Option<&Utf8Path>) -> Result<Utf8PathBuf, CliError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path().ok_or(CliError::ConfigPathUnknown),
    }
}

/// Loads the configuration.
///
/// An explicit `--config` file must exist. A missing default file silently
/// yields the built-in defaults.
pub fn load_config(explicit: Option<&Utf8Path>) -> Result<(EngineConfig, Option<Utf8PathBuf>), CliError> {
    let path = match config_path(explicit) {
        Ok(path) => path,
        Err(CliError::ConfigPathUnknown) => return Ok((EngineConfig::default(), None)),
        Err(e) => return Err(e),
    };

    if !path.as_std_path().exists() {
        if explicit.is_some() {
            return Err(CliError::config_not_found(path));
        }
        tracing::debug!("No config at {}, using defaults", path);
        return Ok((EngineConfig::default(), None));
    }

    let cfg = EngineConfig::load(&path).map_err(|e| CliError::config_parse_error(path.clone(), e))?;
    tracing::debug!("Loaded config from {}", path);
    Ok((cfg, Some(path)))
}

/// Writes the default configuration to `path`.
pub fn write_default_config(path: &Utf8Path, force: bool) -> Result<EngineConfig, CliError> {
    if path.as_std_path().exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.to_path_buf(),
        });
    }
    let cfg = EngineConfig::default();
    cfg.save(path)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8Path::from_path(dir.path()).unwrap().join(name)
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "missing.toml");
        assert!(matches!(
            load_config(Some(&path)),
            Err(CliError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "config.toml");
        std::fs::write(path.as_std_path(), "[online]\nenabled = false\n").unwrap();

        let (cfg, used) = load_config(Some(&path)).unwrap();
        assert!(!cfg.online.enabled);
        assert_eq!(used, Some(path));
    }

    #[test]
    fn broken_config_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "config.toml");
        std::fs::write(path.as_std_path(), "online = [").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(CliError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "deckmon/config.toml");

        write_default_config(&path, false).unwrap();
        assert!(matches!(
            write_default_config(&path, false),
            Err(CliError::ConfigExists { .. })
        ));
        write_default_config(&path, true).unwrap();

        let (cfg, _) = load_config(Some(&path)).unwrap();
        assert!(cfg.online.enabled);
    }
}
