//! Process table snapshots.

use crate::model::ProcessSample;
use sysinfo::System;

/// Anything that can list the currently running processes.
pub trait ProcessSource {
    fn snapshot(&mut self) -> Vec<ProcessSample>;
}

/// Maps a Steam game id to the app id it launches.
///
/// For shortcuts Steam uses a 64-bit game id whose upper half is the
/// shortcut's runtime id. Plain app ids pass through unchanged.
pub fn fold_game_id(game_id: u64) -> u64 {
    if game_id > u64::from(u32::MAX) {
        game_id >> 32
    } else {
        game_id
    }
}

/// Reads the Steam app id hint from `KEY=VALUE` environment entries.
///
/// `SteamGameId` wins over `SteamAppId` and goes through [`fold_game_id`].
/// Zero means unset.
pub fn app_id_from_environment<'a>(vars: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut game_id = None;
    let mut app_id = None;
    for var in vars {
        if let Some(v) = var.strip_prefix("SteamGameId=") {
            game_id = v.trim().parse::<u64>().ok();
        } else if let Some(v) = var.strip_prefix("SteamAppId=") {
            app_id = v.trim().parse::<u64>().ok();
        }
    }

    game_id
        .filter(|&v| v != 0)
        .map(fold_game_id)
        .or(app_id.filter(|&v| v != 0))
        .map(|v| v.to_string())
}

/// Live process table backed by `sysinfo`.
pub struct SysinfoProcessSource {
    system: System,
}

impl Default for SysinfoProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProcessSource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl ProcessSource for SysinfoProcessSource {
    fn snapshot(&mut self) -> Vec<ProcessSample> {
        // CPU usage is a delta between two refreshes.
        self.system.refresh_all();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_all();

        let mut samples = Vec::with_capacity(self.system.processes().len());
        for (pid, process) in self.system.processes() {
            // Kernel threads, exited processes and processes we may not
            // inspect all come back without a command line.
            if process.cmd().is_empty() {
                continue;
            }

            let command_line = process
                .cmd()
                .iter()
                .map(|part| part.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ");

            let environ: Vec<String> = process
                .environ()
                .iter()
                .map(|v| v.to_string_lossy().into_owned())
                .collect();

            samples.push(ProcessSample {
                pid: pid.as_u32(),
                command_line,
                env_app_id: app_id_from_environment(environ.iter().map(String::as_str)),
                cpu: process.cpu_usage(),
                started_at: process.start_time(),
            });
        }

        tracing::debug!("Sampled {} processes", samples.len());
        samples
    }
}

/// A fixed process list.
#[derive(Debug, Clone, Default)]
pub struct StaticProcessSource {
    pub samples: Vec<ProcessSample>,
}

impl StaticProcessSource {
    pub fn new(samples: Vec<ProcessSample>) -> Self {
        Self { samples }
    }
}

impl ProcessSource for StaticProcessSource {
    fn snapshot(&mut self) -> Vec<ProcessSample> {
        self.samples.clone()
    }
}
