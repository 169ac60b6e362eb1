use crate::errors::CliError;
use colored::Colorize;
use deckmon_core::{EngineConfig, GameDetector, GameType, SysinfoProcessSource};
use miette::Result;

pub struct DetectArgs {
    pub json: bool,
}

pub fn detect_game(config: EngineConfig, args: DetectArgs) -> Result<()> {
    let detector = GameDetector::new(config).map_err(CliError::from)?;
    let result = detector.detect(&mut SysinfoProcessSource::new());

    if args.json {
        println!("{}", serde_json::to_string(&result).map_err(CliError::from)?);
        return Ok(());
    }

    if result.is_no_game() {
        println!("{}", result.title.bright_yellow());
        return Ok(());
    }

    let kind = match result.game_type {
        GameType::SteamNative => "Steam",
        GameType::NonSteam => "Non-Steam",
        GameType::Rom => "ROM",
        GameType::ExoDos => "eXoDOS",
        GameType::None => "None",
    };
    println!("{}", result.title.bright_green().bold());
    println!("  {} {}", "Type:".bright_white(), kind.bright_cyan());
    if let Some(app_id) = &result.app_id {
        println!("  {} {}", "App id:".bright_white(), app_id);
    }
    Ok(())
}
