//! Picks the one candidate reported for a detection cycle.

use crate::model::{Candidate, ResolutionResult};
use crate::resolver::TitleResolver;
use std::cmp::Ordering;

/// Ranking used by [`best_candidate`]: resolved first, then higher CPU, then
/// the most recently started process.
pub fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    a.resolved
        .cmp(&b.resolved)
        .then_with(|| a.cpu.total_cmp(&b.cpu))
        .then_with(|| a.started_at.cmp(&b.started_at))
}

/// The highest ranked candidate. On a full tie the earliest one wins.
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().reduce(|best, c| {
        if rank(c, best) == Ordering::Greater {
            c
        } else {
            best
        }
    })
}

/// Whether a title is junk that must never be reported.
fn is_spurious(title: &str) -> bool {
    title.starts_with('.') || title.trim().is_empty()
}

/// Reduces a cycle's candidates to its final result.
///
/// Unresolved winners go through `resolver`; an empty candidate set yields
/// [`ResolutionResult::no_game`].
pub fn select(candidates: &[Candidate], resolver: &mut TitleResolver<'_>) -> ResolutionResult {
    let Some(best) = best_candidate(candidates) else {
        return ResolutionResult::no_game();
    };
    if is_spurious(&best.title) {
        tracing::debug!("Discarding spurious candidate {:?}", best.title);
        return ResolutionResult::no_game();
    }

    let title = if best.resolved {
        best.title.clone()
    } else {
        resolver.resolve(&best.title, best.app_id.as_deref())
    };
    if is_spurious(&title) {
        return ResolutionResult::no_game();
    }

    ResolutionResult {
        title,
        app_id: best.app_id.clone(),
        game_type: best.game_type,
    }
}
