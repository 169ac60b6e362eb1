//! Online title lookups.
//!
//! Three read-only services are consulted:
//!
//! - the Steam store `appdetails` endpoint, by genuine app id
//! - the Steam store `storesearch` endpoint, by search term (primary)
//! - the CheapShark `games` endpoint, by search term (secondary)
//!
//! Every request is time-bounded and every failure degrades to "no result".
//! Nothing in this module returns an error to the resolver.

use crate::appid;
use crate::config::OnlineConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Minimum similarity for accepting the top primary search hit.
pub const PRIMARY_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Minimum similarity for accepting a secondary search hit.
pub const SECONDARY_SIMILARITY_THRESHOLD: f64 = 0.65;

/// Something that can turn an app id or a search term into a title.
pub trait TitleSource {
    /// Authoritative title for a genuine Steam app id.
    fn title_by_app_id(&self, app_id: &str) -> Option<String>;

    /// Best matching title for a cleaned search term.
    fn search_title(&self, term: &str) -> Option<String>;
}

/// A source that never answers, used when online lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl TitleSource for OfflineSource {
    fn title_by_app_id(&self, _app_id: &str) -> Option<String> {
        None
    }

    fn search_title(&self, _term: &str) -> Option<String> {
        None
    }
}

fn word_set(s: &str) -> HashSet<String> {
    s.split_whitespace().map(str::to_lowercase).collect()
}

/// Word overlap between two names: shared lowercase words divided by the
/// size of the larger word set.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / larger as f64
}

/// Picks a primary search hit for `term`.
///
/// Exact match, then prefix, then substring (all case-insensitive). If none
/// of those hit, the top-ranked result is accepted only when its
/// [`token_similarity`] exceeds [`PRIMARY_SIMILARITY_THRESHOLD`].
pub fn pick_primary_match(term: &str, names: &[String]) -> Option<String> {
    let needle = term.to_lowercase();
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

    let find = |pred: fn(&str, &str) -> bool| {
        lowered
            .iter()
            .position(|n| pred(n.as_str(), needle.as_str()))
            .map(|i| names[i].clone())
    };

    find(|n, needle| n == needle)
        .or_else(|| find(|n, needle| n.starts_with(needle)))
        .or_else(|| find(|n, needle| n.contains(needle)))
        .or_else(|| {
            let top = names.first()?;
            (token_similarity(top, term) > PRIMARY_SIMILARITY_THRESHOLD).then(|| top.clone())
        })
}

/// Picks a secondary search hit for `term`.
///
/// Exact case-insensitive match first, otherwise the most similar result
/// whose [`token_similarity`] exceeds [`SECONDARY_SIMILARITY_THRESHOLD`].
pub fn pick_secondary_match(term: &str, names: &[String]) -> Option<String> {
    let needle = term.to_lowercase();
    if let Some(exact) = names.iter().find(|n| n.to_lowercase() == needle) {
        return Some(exact.clone());
    }

    let mut best: Option<(&String, f64)> = None;
    for name in names {
        let score = token_similarity(name, term);
        if score <= SECONDARY_SIMILARITY_THRESHOLD {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((name, score)),
        }
    }
    best.map(|(name, _)| name.clone())
}

#[derive(Debug, Deserialize)]
struct StoreSearchResponse {
    #[serde(default)]
    items: Vec<StoreSearchItem>,
}

#[derive(Debug, Deserialize)]
struct StoreSearchItem {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SecondaryGame {
    external: String,
}

/// Extracts the title from an `appdetails` response body.
///
/// The body is keyed by app id: `{"620": {"success": true, "data": {"name": ..}}}`.
fn app_details_title(body: &serde_json::Value, app_id: &str) -> Option<String> {
    let entry = body.get(app_id)?;
    if !entry.get("success")?.as_bool()? {
        return None;
    }
    let name = entry.get("data")?.get("name")?.as_str()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// HTTP-backed [`TitleSource`].
#[derive(Debug, Clone)]
pub struct OnlineResolver {
    client: reqwest::blocking::Client,
    config: OnlineConfig,
}

impl OnlineResolver {
    pub fn new(config: &OnlineConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("deckmon/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self.client.get(url).query(query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.json()?)
    }

    fn fetch_app_details(&self, app_id: &str) -> Result<Option<String>> {
        let body: serde_json::Value = self.get_json(
            &self.config.app_details_url,
            &[
                ("appids", app_id),
                ("cc", self.config.country.as_str()),
                ("l", self.config.language.as_str()),
            ],
        )?;
        Ok(app_details_title(&body, app_id))
    }

    fn fetch_store_search(&self, term: &str) -> Result<Vec<String>> {
        let resp: StoreSearchResponse = self.get_json(
            &self.config.store_search_url,
            &[
                ("term", term),
                ("cc", self.config.country.as_str()),
                ("l", self.config.language.as_str()),
            ],
        )?;
        Ok(resp.items.into_iter().map(|i| i.name).collect())
    }

    fn fetch_secondary_search(&self, term: &str) -> Result<Vec<String>> {
        let games: Vec<SecondaryGame> = self.get_json(
            &self.config.secondary_search_url,
            &[("title", term), ("limit", "20")],
        )?;
        Ok(games.into_iter().map(|g| g.external).collect())
    }
}

impl TitleSource for OnlineResolver {
    fn title_by_app_id(&self, app_id: &str) -> Option<String> {
        if !appid::is_genuine_str(app_id) {
            return None;
        }
        match self.fetch_app_details(app_id) {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!("App id lookup for {} failed: {}", app_id, e);
                None
            }
        }
    }

    fn search_title(&self, term: &str) -> Option<String> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        match self.fetch_store_search(term) {
            Ok(names) => {
                if let Some(title) = pick_primary_match(term, &names) {
                    return Some(title);
                }
            }
            Err(e) => tracing::warn!("Store search for {:?} failed: {}", term, e),
        }

        match self.fetch_secondary_search(term) {
            Ok(names) => pick_secondary_match(term, &names),
            Err(e) => {
                tracing::warn!("Secondary search for {:?} failed: {}", term, e);
                None
            }
        }
    }
}
