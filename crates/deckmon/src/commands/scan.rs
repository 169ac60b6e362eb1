use crate::errors::CliError;
use crate::println_pad;
use colored::Colorize;
use deckmon_core::{EngineConfig, GameDetector, SysinfoProcessSource};
use miette::Result;

pub struct ScanArgs {
    pub show_command: bool,
}

pub fn scan_processes(config: EngineConfig, args: ScanArgs) -> Result<()> {
    let detector = GameDetector::new(config).map_err(CliError::from)?;
    let mut hits = detector.scan(&mut SysinfoProcessSource::new());

    if hits.is_empty() {
        println!("{}", "No game candidates found".bright_yellow());
        return Ok(());
    }

    hits.sort_by(|a, b| deckmon_core::selector::rank(&b.candidate, &a.candidate));

    println!(
        "{}",
        format!("{} candidate(s), best first:", hits.len()).bright_white().bold()
    );
    for hit in &hits {
        let c = &hit.candidate;
        let status = if c.resolved {
            "resolved".bright_green()
        } else {
            "raw".bright_yellow()
        };
        let cpu = if c.cpu == deckmon_core::model::SATURATED_CPU {
            "max".to_string()
        } else {
            format!("{:.1}%", c.cpu)
        };

        println_pad!(
            "{} {} [{}] {} ({}, {}, cpu {})",
            "•".bright_cyan(),
            hit.pid.to_string().bright_white(),
            hit.rule.bright_magenta(),
            c.title.bright_green(),
            c.game_type,
            status,
            cpu
        );
        if let Some(app_id) = &c.app_id {
            println_pad!("    app id {}", app_id);
        }
        if args.show_command {
            println_pad!("    {}", hit.command_line.dimmed());
        }
    }
    Ok(())
}
