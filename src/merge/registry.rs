use log::{debug, info};
use std::collections::BTreeMap;

use super::matches::Match;
use super::report::MergeReport;
use crate::config::DisplaySettings;
use crate::domain::{MatchDefinition, MatchScores};

/// Owns every merged match, keyed by match id. Devices reporting the same
/// id feed the same `Match`.
#[derive(Debug, Clone, Default)]
pub struct MatchRegistry {
    matches: BTreeMap<String, Match>,
    display: DisplaySettings,
}

impl MatchRegistry {
    pub fn new(display: DisplaySettings) -> Self {
        Self {
            matches: BTreeMap::new(),
            display,
        }
    }

    /// Merges one device's documents. Returns `None` when the definition
    /// carries no match id.
    pub fn merge_match(
        &mut self,
        definition: &MatchDefinition,
        scores: Option<&MatchScores>,
    ) -> Option<MergeReport> {
        if definition.match_id.is_empty() {
            debug!("Ignoring definition without match id");
            return None;
        }

        let entry = self
            .matches
            .entry(definition.match_id.clone())
            .or_insert_with(|| {
                let created = Match::new(definition);
                info!(
                    "New match {} '{}' ({})",
                    created.id,
                    created.name,
                    created.discipline.as_str()
                );
                created
            });

        let report = entry.merge(definition, scores, &self.display);
        debug!(
            "Merged match {}: {} inserted, {} updated, {} stale",
            definition.match_id, report.inserted, report.updated, report.stale
        );
        Some(report)
    }

    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
