//! One-call game detection.
//!
//! [`GameDetector`] owns the build-once indexes and the online source, and
//! runs a full cycle: snapshot processes, classify them, pick one candidate
//! and resolve its title. The title cache is reloaded from disk at the start
//! of every cycle so separate invocations share what earlier ones learned.

use crate::audit_log::AuditLog;
use crate::cache::TitleCache;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::manifest::ManifestIndex;
use crate::model::{ProcessSample, ResolutionResult};
use crate::online::{OfflineSource, OnlineResolver, TitleSource};
use crate::resolver::{TitleOrigin, TitleResolver};
use crate::scanner::{ProcessScanner, ProcessSource, RuleSet, ScanHit};
use crate::selector;
use crate::shortcuts::ShortcutIndex;
use crate::steam_paths;

pub struct GameDetector {
    config: EngineConfig,
    rules: RuleSet,
    manifests: ManifestIndex,
    shortcuts: ShortcutIndex,
    online: Box<dyn TitleSource>,
    audit: AuditLog,
}

fn build_indexes(config: &EngineConfig) -> (ManifestIndex, ShortcutIndex) {
    let roots = steam_paths::library_roots(&config.steam_roots, &config.extra_library_roots);
    let manifests = ManifestIndex::build(&roots);
    let shortcuts = ShortcutIndex::build(&steam_paths::shortcut_files(&config.steam_roots));
    (manifests, shortcuts)
}

impl GameDetector {
    /// Builds the indexes from the configured Steam roots.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let online: Box<dyn TitleSource> = if config.online.enabled {
            Box::new(OnlineResolver::new(&config.online)?)
        } else {
            tracing::info!("Online title lookups disabled");
            Box::new(OfflineSource)
        };
        let (manifests, shortcuts) = build_indexes(&config);
        Self::from_parts(config, manifests, shortcuts, online)
    }

    /// Assembles a detector from prebuilt indexes and a title source.
    pub fn from_parts(
        config: EngineConfig,
        manifests: ManifestIndex,
        shortcuts: ShortcutIndex,
        online: Box<dyn TitleSource>,
    ) -> Result<Self> {
        let rules = RuleSet::compile(&config.scanner)?;
        let audit = AuditLog::new(config.audit_log_path());
        Ok(Self {
            config,
            rules,
            manifests,
            shortcuts,
            online,
            audit,
        })
    }

    /// Re-reads manifests and shortcut registries, e.g. after an install.
    pub fn rebuild_indexes(&mut self) {
        let (manifests, shortcuts) = build_indexes(&self.config);
        self.manifests = manifests;
        self.shortcuts = shortcuts;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn manifests(&self) -> &ManifestIndex {
        &self.manifests
    }

    pub fn shortcuts(&self) -> &ShortcutIndex {
        &self.shortcuts
    }

    fn scanner(&self) -> ProcessScanner<'_> {
        ProcessScanner::new(&self.rules, &self.manifests, &self.shortcuts)
    }

    fn load_cache(&self) -> TitleCache {
        TitleCache::load(self.config.cache_path(), self.config.cache_backup_path())
    }

    /// Classifies a process snapshot without resolving anything.
    pub fn scan(&self, source: &mut dyn ProcessSource) -> Vec<ScanHit> {
        self.scanner().scan(&source.snapshot())
    }

    /// Runs one detection cycle against `source`.
    pub fn detect(&self, source: &mut dyn ProcessSource) -> ResolutionResult {
        self.detect_samples(&source.snapshot())
    }

    /// Runs one detection cycle against an already taken snapshot.
    pub fn detect_samples(&self, samples: &[ProcessSample]) -> ResolutionResult {
        let candidates = self.scanner().candidates(samples);
        let mut cache = self.load_cache();
        let mut resolver = TitleResolver::new(
            &self.manifests,
            &self.shortcuts,
            self.online.as_ref(),
            &mut cache,
        )
        .with_audit_log(&self.audit);

        let result = selector::select(&candidates, &mut resolver);
        self.audit.record(&format!(
            "Detected: {} ({})",
            result.title, result.game_type
        ));
        tracing::info!(
            "Detected {:?} (app id {:?}, {})",
            result.title,
            result.app_id,
            result.game_type
        );
        result
    }

    /// Resolves a raw name outside of a detection cycle.
    pub fn resolve_title(&self, raw_name: &str, app_id: Option<&str>) -> (String, TitleOrigin) {
        let mut cache = self.load_cache();
        TitleResolver::new(
            &self.manifests,
            &self.shortcuts,
            self.online.as_ref(),
            &mut cache,
        )
        .with_audit_log(&self.audit)
        .resolve_with_origin(raw_name, app_id)
    }
}
