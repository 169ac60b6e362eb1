use crate::errors::CliError;
use colored::Colorize;
use deckmon_core::{EngineConfig, GameDetector};
use miette::Result;

pub struct ResolveArgs {
    pub name: String,
    pub app_id: Option<String>,
    pub offline: bool,
}

fn validate_app_id(app_id: &str) -> Result<(), CliError> {
    if app_id.is_empty() || app_id.parse::<u64>().is_err() {
        return Err(CliError::invalid_app_id(app_id.to_string()));
    }
    Ok(())
}

pub fn resolve_name(mut config: EngineConfig, args: ResolveArgs) -> Result<()> {
    if let Some(app_id) = &args.app_id {
        validate_app_id(app_id)?;
    }
    if args.offline {
        config.online.enabled = false;
    }

    let detector = GameDetector::new(config).map_err(CliError::from)?;
    let (title, origin) = detector.resolve_title(&args.name, args.app_id.as_deref());

    println!("{}", title.bright_green().bold());
    println!("  {} {:?}", "Source:".bright_white(), origin);
    Ok(())
}
