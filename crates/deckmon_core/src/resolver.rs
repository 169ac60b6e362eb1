//! Raw name to display title resolution.
//!
//! Sources are tried in a fixed order and the first answer wins:
//!
//! 1. title cache, by app id and then by raw name
//! 2. online lookup by app id (genuine ids only)
//! 3. manifest index, by app id and then by install folder
//! 4. shortcut index, by runtime id and then by name
//! 5. online search with the normalized name
//! 6. the normalized name, title-cased
//!
//! Anything found in steps 2-6 is written back to the cache under the app id
//! and the raw name, so the next cycle stops at step 1.

use crate::appid;
use crate::audit_log::AuditLog;
use crate::cache::TitleCache;
use crate::manifest::ManifestIndex;
use crate::normalize::{normalize, title_case};
use crate::online::TitleSource;
use crate::shortcuts::ShortcutIndex;

/// Which step produced a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOrigin {
    Cache,
    OnlineAppId,
    Manifest,
    Shortcut,
    OnlineSearch,
    Fallback,
}

pub struct TitleResolver<'a> {
    manifests: &'a ManifestIndex,
    shortcuts: &'a ShortcutIndex,
    online: &'a dyn TitleSource,
    cache: &'a mut TitleCache,
    audit: Option<&'a AuditLog>,
}

impl<'a> TitleResolver<'a> {
    pub fn new(
        manifests: &'a ManifestIndex,
        shortcuts: &'a ShortcutIndex,
        online: &'a dyn TitleSource,
        cache: &'a mut TitleCache,
    ) -> Self {
        Self {
            manifests,
            shortcuts,
            online,
            cache,
            audit: None,
        }
    }

    /// Records every newly learned title in `audit`.
    pub fn with_audit_log(mut self, audit: &'a AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Resolves `raw_name` to a display title.
    pub fn resolve(&mut self, raw_name: &str, app_id: Option<&str>) -> String {
        self.resolve_with_origin(raw_name, app_id).0
    }

    pub fn resolve_with_origin(&mut self, raw_name: &str, app_id: Option<&str>) -> (String, TitleOrigin) {
        let app_id = app_id.map(str::trim).filter(|id| !id.is_empty());

        if let Some(title) = self.cached(raw_name, app_id) {
            tracing::debug!("Cache hit for {:?}: {:?}", raw_name, title);
            return (title, TitleOrigin::Cache);
        }

        let (title, origin) = self.lookup(raw_name, app_id);
        tracing::info!("Resolved {:?} to {:?} via {:?}", raw_name, title, origin);
        self.remember(raw_name, app_id, &title);
        (title, origin)
    }

    fn cached(&self, raw_name: &str, app_id: Option<&str>) -> Option<String> {
        app_id
            .and_then(|id| self.cache.get(id))
            .or_else(|| self.cache.get(raw_name))
            .map(str::to_string)
    }

    fn lookup(&self, raw_name: &str, app_id: Option<&str>) -> (String, TitleOrigin) {
        if let Some(id) = app_id.filter(|id| appid::is_genuine_str(id)) {
            if let Some(title) = self.online.title_by_app_id(id) {
                return (title, TitleOrigin::OnlineAppId);
            }
        }

        let manifest_hit = app_id
            .and_then(|id| self.manifests.title_for_app_id(id))
            .or_else(|| self.manifests.title_for_folder(raw_name));
        if let Some(title) = manifest_hit {
            return (title.to_string(), TitleOrigin::Manifest);
        }

        let shortcut_hit = app_id
            .and_then(|id| self.shortcuts.title_for_id(id))
            .or_else(|| self.shortcuts.title_for_name(raw_name));
        if let Some(title) = shortcut_hit {
            return (title.to_string(), TitleOrigin::Shortcut);
        }

        let cleaned = normalize(raw_name);
        if !cleaned.is_empty() {
            if let Some(title) = self.online.search_title(&cleaned) {
                return (title, TitleOrigin::OnlineSearch);
            }
        }

        let fallback = if cleaned.is_empty() {
            raw_name.trim().to_string()
        } else {
            title_case(&cleaned)
        };
        (fallback, TitleOrigin::Fallback)
    }

    fn remember(&mut self, raw_name: &str, app_id: Option<&str>, title: &str) {
        if let Some(id) = app_id {
            self.cache.put(id, title);
        }
        if !raw_name.is_empty() {
            self.cache.put(raw_name, title);
        }
        if let Err(e) = self.cache.flush() {
            tracing::warn!("Failed to persist title cache {}: {}", self.cache.path(), e);
        }
        if let Some(audit) = self.audit {
            audit.record(&format!("New entry: {} -> {}", raw_name, title));
        }
    }
}
