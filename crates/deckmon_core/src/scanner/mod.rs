//! Process scanning: turns a process table snapshot into game candidates.

mod process;
mod rules;

pub use process::{
    app_id_from_environment, fold_game_id, ProcessSource, StaticProcessSource, SysinfoProcessSource,
};
pub use rules::{extract_app_id, folder_from_path, longest_path, RuleOutcome, RuleSet, RULES};

use crate::manifest::ManifestIndex;
use crate::model::{Candidate, ProcessSample};
use crate::shortcuts::ShortcutIndex;
use rules::RuleContext;

/// A candidate together with the process and rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHit {
    pub pid: u32,
    pub rule: &'static str,
    pub command_line: String,
    pub candidate: Candidate,
}

/// Runs the rule chain over process samples.
pub struct ProcessScanner<'a> {
    ctx: RuleContext<'a>,
}

impl<'a> ProcessScanner<'a> {
    pub fn new(rules: &'a RuleSet, manifests: &'a ManifestIndex, shortcuts: &'a ShortcutIndex) -> Self {
        Self {
            ctx: RuleContext {
                rules,
                manifests,
                shortcuts,
            },
        }
    }

    /// Classifies one process. At most one rule fires.
    pub fn classify(&self, sample: &ProcessSample) -> Option<ScanHit> {
        for (name, rule) in RULES {
            match rule(&self.ctx, sample) {
                RuleOutcome::Pass => continue,
                RuleOutcome::Drop => return None,
                RuleOutcome::Emit(candidate) => {
                    return Some(ScanHit {
                        pid: sample.pid,
                        rule: *name,
                        command_line: sample.command_line.clone(),
                        candidate,
                    })
                }
            }
        }
        None
    }

    /// Classifies every sample, keeping the ones that produced a candidate.
    pub fn scan(&self, samples: &[ProcessSample]) -> Vec<ScanHit> {
        let hits: Vec<ScanHit> = samples.iter().filter_map(|s| self.classify(s)).collect();
        for hit in &hits {
            tracing::debug!(
                "pid {} matched {}: {:?} ({})",
                hit.pid,
                hit.rule,
                hit.candidate.title,
                hit.candidate.game_type
            );
        }
        hits
    }

    pub fn candidates(&self, samples: &[ProcessSample]) -> Vec<Candidate> {
        self.scan(samples).into_iter().map(|h| h.candidate).collect()
    }
}
