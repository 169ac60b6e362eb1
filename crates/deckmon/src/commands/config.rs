use crate::utils::config;
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use deckmon_core::{steam_paths, EngineConfig};
use miette::Result;

/// Print a path entry with an existence indicator.
fn print_path(name: &str, path: &Utf8Path) {
    let status = if path.as_std_path().exists() {
        "✓".bright_green()
    } else {
        "✗".bright_red()
    };
    println!("  {} {} {}", format!("{}:", name).bright_white(), path, status);
}

pub fn show_config(cfg: &EngineConfig, loaded_from: Option<&Utf8Path>) -> Result<()> {
    println!();
    match loaded_from {
        Some(path) => println!("  {} {}", "config_file:".bright_white(), path),
        None => println!(
            "  {} {}",
            "config_file:".bright_white(),
            "(defaults)".bright_yellow()
        ),
    }

    for root in &cfg.steam_roots {
        let status = if steam_paths::is_steam_root(root) {
            "✓".bright_green()
        } else {
            "✗".bright_red()
        };
        println!("  {} {} {}", "steam_root:".bright_white(), root, status);
    }
    print_path("cache", &cfg.cache_path());
    print_path("cache_backup", &cfg.cache_backup_path());
    print_path("audit_log", &cfg.audit_log_path());
    println!(
        "  {} {}",
        "online:".bright_white(),
        if cfg.online.enabled {
            "enabled".bright_green()
        } else {
            "disabled".bright_yellow()
        }
    );
    println!();
    Ok(())
}

pub struct InitConfigArgs {
    pub path: Option<Utf8PathBuf>,
    pub force: bool,
}

pub fn init_config(args: InitConfigArgs) -> Result<()> {
    let path = config::config_path(args.path.as_deref())?;
    let cfg = config::write_default_config(&path, args.force)?;

    println!("{}", "✓ Default configuration written".bright_green().bold());
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), path);
    println!(
        "  {} {}",
        "Steam roots:".bright_white().bold(),
        cfg.steam_roots
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
