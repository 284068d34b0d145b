//! Per-discipline scoring. Every run is two passes over one match: stage
//! aggregates first, then per-shooter cells that read them.

pub mod ipsc;
pub mod penalties;
pub mod rank;
pub mod sass;
pub mod scsa;
pub mod targets;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::Discipline;
use crate::merge::{Match, Shooter};

pub use ipsc::{HitCounts, IpscCell, IpscState};
pub use sass::SassCell;
pub use scsa::StringsCell;
pub use targets::TargetsCell;

/// Pass-1 result for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageAggregate {
    /// Active shooters with a usable score
    pub scored: usize,
    /// Best stage value among them (hit factor for IPSC)
    pub best: Option<f64>,
    /// Best hit factor per division (IPSC only)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub max_hit_factors: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellDetail {
    Ipsc(IpscCell),
    Strings(StringsCell),
    Sass(SassCell),
    Targets(TargetsCell),
}

/// One shooter's derived result on one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageCell {
    pub stage_id: String,
    /// Contribution to the match total
    pub value: f64,
    pub display: String,
    pub detail: CellDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShooterResult {
    pub shooter_id: String,
    pub name: String,
    pub division: String,
    pub short_division: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub power_factor: String,
    pub stages: Vec<StageCell>,
    pub total: f64,
    pub total_display: String,
    pub place: usize,
    pub division_place: usize,
}

impl ShooterResult {
    pub fn new(shooter: &Shooter, stages: Vec<StageCell>, total: f64, total_display: String) -> Self {
        Self {
            shooter_id: shooter.id.clone(),
            name: shooter.name(),
            division: shooter.division.clone(),
            short_division: shooter.short_division.clone(),
            power_factor: shooter.power_factor.clone(),
            stages,
            total,
            total_display,
            place: 0,
            division_place: 0,
        }
    }

    pub fn cell(&self, stage_id: &str) -> Option<&StageCell> {
        self.stages.iter().find(|c| c.stage_id == stage_id)
    }
}

/// Derived results for one match, ranked best-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredMatch {
    pub stages: BTreeMap<String, StageAggregate>,
    pub results: Vec<ShooterResult>,
}

impl ScoredMatch {
    /// Results of one division in ranked order.
    pub fn division(&self, division: &str) -> Vec<&ShooterResult> {
        self.results.iter().filter(|r| r.division == division).collect()
    }

    /// Divisions in first-appearance order of their best shooter.
    pub fn divisions(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for result in &self.results {
            if !seen.contains(&result.division.as_str()) {
                seen.push(&result.division);
            }
        }
        seen
    }
}

/// Runs the discipline's scoring over a merged match. Placeholder matches
/// of an unknown discipline score to nothing.
pub fn score_match(m: &Match) -> ScoredMatch {
    let (stages, results) = match m.discipline {
        Discipline::Ipsc => ipsc::score(m),
        Discipline::Scsa => scsa::score(m),
        Discipline::Sass => sass::score(m),
        Discipline::Nra | Discipline::Silhouette => targets::score(m),
        Discipline::Unknown => return ScoredMatch::default(),
    };

    ScoredMatch {
        stages,
        results: rank::rank(results, m.discipline.rank_order()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MatchRegistry;

    fn merged(definition: &str, scores: &str) -> Match {
        let mut registry = MatchRegistry::default();
        registry.merge_match(
            &serde_json::from_str(definition).unwrap(),
            Some(&serde_json::from_str(scores).unwrap()),
        );
        registry.matches().next().unwrap().clone()
    }

    #[test]
    fn test_ipsc_ranks_by_match_points() {
        let m = merged(
            r#"{"match_id": "m1", "match_subtype": "ipsc",
                "match_pfs": [{"name": "Major", "A": 5}],
                "match_shooters": [
                    {"sh_uid": "a", "sh_dvp": "Open", "sh_pf": "Major"},
                    {"sh_uid": "b", "sh_dvp": "Open", "sh_pf": "Major"}
                ],
                "match_stages": [{"stage_uuid": "st1", "stage_targets": [{"target_reqshots": 2}]}]}"#,
            r#"{"match_scores": [{"stage_uuid": "st1", "stage_stagescores": [
                {"shtr": "a", "str": [4.0], "ts": [1]},
                {"shtr": "b", "str": [4.0], "ts": [2]}
            ]}]}"#,
        );

        let scored = score_match(&m);

        assert_eq!(scored.results[0].shooter_id, "b");
        assert_eq!(scored.results[0].total, 10.0);
        assert_eq!(scored.results[1].total, 5.0);
        assert_eq!(scored.divisions(), vec!["Open"]);
    }

    #[test]
    fn test_scsa_ranks_lowest_first() {
        let m = merged(
            r#"{"match_id": "m1", "match_subtype": "scsa",
                "match_shooters": [{"sh_uid": "a"}, {"sh_uid": "b"}],
                "match_stages": [{"stage_uuid": "st1"}]}"#,
            r#"{"match_scores": [{"stage_uuid": "st1", "stage_stagescores": [
                {"shtr": "a", "str": [6, 6, 6, 6, 6]},
                {"shtr": "b", "str": [4, 4, 4, 4, 4]}
            ]}]}"#,
        );

        let scored = score_match(&m);

        assert_eq!(scored.results[0].shooter_id, "b");
        assert_eq!(scored.results[0].place, 1);
    }

    #[test]
    fn test_unknown_discipline_scores_nothing() {
        let m = merged(
            r#"{"match_id": "m1", "match_subtype": "idpa", "match_shooters": [{"sh_uid": "a"}]}"#,
            r#"{"match_scores": []}"#,
        );

        assert_eq!(score_match(&m), ScoredMatch::default());
    }

    #[test]
    fn test_cells_serialize_with_kind_tag() {
        let cell = StageCell {
            stage_id: "st1".to_string(),
            value: 300.0,
            display: "-".to_string(),
            detail: CellDetail::Sass(SassCell {
                time: 0.0,
                misses: 0,
                penalties: 0.0,
                result: false,
            }),
        };

        let json = serde_json::to_value(&cell).unwrap();

        assert_eq!(json["detail"]["kind"], "sass");
        assert_eq!(json["detail"]["result"], false);
    }
}
