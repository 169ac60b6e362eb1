//! Data types shared between the scanner, the selector and the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title reported when nothing could be identified.
pub const NO_GAME_TITLE: &str = "No game opened";

/// CPU weight given to candidates that must outrank every sampled process.
pub const SATURATED_CPU: f32 = f32::MAX;

/// One running process as seen during a single scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    /// Program and arguments joined with single spaces.
    pub command_line: String,
    /// `SteamGameId` / `SteamAppId` from the process environment, if readable.
    pub env_app_id: Option<String>,
    pub cpu: f32,
    /// Start time in seconds since the UNIX epoch.
    pub started_at: u64,
}

/// Where a detected title comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    SteamNative,
    NonSteam,
    Rom,
    ExoDos,
    None,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameType::SteamNative => "SteamNative",
            GameType::NonSteam => "NonSteam",
            GameType::Rom => "Rom",
            GameType::ExoDos => "ExoDos",
            GameType::None => "None",
        };
        f.write_str(s)
    }
}

/// A process that looks like a game.
///
/// `resolved` means `title` is already a display name and needs no lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub app_id: Option<String>,
    pub game_type: GameType,
    pub resolved: bool,
    pub cpu: f32,
    pub started_at: u64,
}

impl Candidate {
    pub fn resolved(
        title: impl Into<String>,
        app_id: Option<String>,
        game_type: GameType,
        sample: &ProcessSample,
    ) -> Self {
        Self {
            title: title.into(),
            app_id,
            game_type,
            resolved: true,
            cpu: sample.cpu,
            started_at: sample.started_at,
        }
    }

    pub fn unresolved(
        title: impl Into<String>,
        app_id: Option<String>,
        game_type: GameType,
        sample: &ProcessSample,
    ) -> Self {
        Self {
            title: title.into(),
            app_id,
            game_type,
            resolved: false,
            cpu: sample.cpu,
            started_at: sample.started_at,
        }
    }

    /// Forces this candidate to outrank any sampled CPU value.
    pub fn saturated(mut self) -> Self {
        self.cpu = SATURATED_CPU;
        self
    }
}

/// The identity reported for one detection cycle.
///
/// # JSON format
///
/// ```json
/// { "title": "Portal 2", "appId": "620", "gameType": "SteamNative" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub title: String,
    pub app_id: Option<String>,
    pub game_type: GameType,
}

impl ResolutionResult {
    /// The sentinel result for a cycle with nothing to report.
    pub fn no_game() -> Self {
        Self {
            title: NO_GAME_TITLE.to_string(),
            app_id: None,
            game_type: GameType::None,
        }
    }

    pub fn is_no_game(&self) -> bool {
        self.game_type == GameType::None && self.title == NO_GAME_TITLE
    }
}
