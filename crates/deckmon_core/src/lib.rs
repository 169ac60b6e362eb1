//! Game identity resolution for handheld gaming PCs.
//!
//! Answers "which game is running right now, and what is it called?" by
//! combining the process table with Steam's on-disk catalogues (app manifests
//! and the non-Steam shortcut registry), a persistent title cache and
//! optional online lookups.
//!
//! The usual entry point is [`GameDetector`]:
//!
//! ```no_run
//! use deckmon_core::{EngineConfig, GameDetector, SysinfoProcessSource};
//!
//! let detector = GameDetector::new(EngineConfig::default())?;
//! let result = detector.detect(&mut SysinfoProcessSource::new());
//! println!("{}", result.title);
//! # Ok::<(), deckmon_core::Error>(())
//! ```
//!
//! Every failure inside a detection cycle degrades to a less informed but
//! valid answer; the worst case is [`ResolutionResult::no_game`].

pub mod appid;
pub mod audit_log;
pub mod cache;
pub mod config;
pub mod detector;
pub mod error;
pub mod manifest;
pub mod model;
pub mod normalize;
pub mod online;
pub mod resolver;
pub mod scanner;
pub mod selector;
pub mod shortcuts;
pub mod steam_paths;

pub use audit_log::AuditLog;
pub use cache::TitleCache;
pub use config::{EngineConfig, OnlineConfig, ScannerRules};
pub use detector::GameDetector;
pub use error::{Error, Result};
pub use manifest::ManifestIndex;
pub use model::{Candidate, GameType, ProcessSample, ResolutionResult, NO_GAME_TITLE};
pub use normalize::normalize;
pub use online::{OfflineSource, OnlineResolver, TitleSource};
pub use resolver::{TitleOrigin, TitleResolver};
pub use scanner::{ProcessScanner, ProcessSource, ScanHit, StaticProcessSource, SysinfoProcessSource};
pub use shortcuts::ShortcutIndex;

#[cfg(test)]
mod tests;
