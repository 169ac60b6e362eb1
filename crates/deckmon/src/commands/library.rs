use crate::println_pad;
use colored::Colorize;
use deckmon_core::steam_paths;
use deckmon_core::{EngineConfig, ManifestIndex, ShortcutIndex};
use miette::Result;

pub struct LibraryArgs {
    pub list: bool,
}

fn print_titles<'a>(heading: &str, titles: impl Iterator<Item = (&'a str, &'a str)>) {
    let mut titles: Vec<_> = titles.collect();
    titles.sort_by_key(|(_, name)| name.to_lowercase());
    println!("{}", heading.bright_magenta().bold());
    for (id, name) in titles {
        println_pad!("{} {} {}", "•".bright_cyan(), name, format!("({})", id).dimmed());
    }
}

pub fn show_library(config: EngineConfig, args: LibraryArgs) -> Result<()> {
    let roots = steam_paths::library_roots(&config.steam_roots, &config.extra_library_roots);
    let shortcut_files = steam_paths::shortcut_files(&config.steam_roots);

    println!("{}", "Library roots:".bright_white().bold());
    if roots.is_empty() {
        println_pad!("{}", "(none found)".bright_yellow());
    }
    for root in &roots {
        println_pad!("{} {}", "•".bright_cyan(), root);
    }

    println!("{}", "Shortcut registries:".bright_white().bold());
    if shortcut_files.is_empty() {
        println_pad!("{}", "(none found)".bright_yellow());
    }
    for file in &shortcut_files {
        println_pad!("{} {}", "•".bright_cyan(), file);
    }

    let manifests = ManifestIndex::build(&roots);
    let shortcuts = ShortcutIndex::build(&shortcut_files);

    println!();
    println!(
        "  {} {}",
        "Installed Steam titles:".bright_white(),
        manifests.len().to_string().bright_green()
    );
    println!(
        "  {} {}",
        "Non-Steam shortcuts:".bright_white(),
        shortcuts.len().to_string().bright_green()
    );

    if args.list {
        println!();
        print_titles("Steam:", manifests.titles());
        print_titles("Shortcuts:", shortcuts.titles());
    }
    Ok(())
}
