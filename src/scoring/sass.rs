use ndarray::Axis;
use serde::Serialize;
use std::collections::BTreeMap;

use super::penalties::{penalty_matrix, weighted, CATEGORIES};
use super::{CellDetail, ShooterResult, StageAggregate, StageCell};
use crate::merge::{Match, RawScore, Stage, StageScore};

/// Seconds per penalty: miss, minor, procedural, major.
pub const PENALTY_WEIGHTS: [f64; CATEGORIES] = [5.0, 10.0, 10.0, 30.0];
pub const STAGE_CAP: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SassCell {
    pub time: f64,
    pub misses: u32,
    /// Penalty seconds before the cap
    pub penalties: f64,
    pub result: bool,
}

/// Raw time plus weighted penalty counts, capped. A zero time is treated
/// as no result.
pub fn stage_total(time: f64, penalty_seconds: f64) -> f64 {
    if time <= 0.0 {
        return STAGE_CAP;
    }
    (time + penalty_seconds).min(STAGE_CAP)
}

/// Returns (raw time, misses, penalty seconds) for one score.
pub fn breakdown(strings: &[f64], penalties: &[Vec<u32>]) -> (f64, u32, f64) {
    let time: f64 = strings.iter().sum();
    let counts = penalty_matrix(penalties, penalties.len()).sum_axis(Axis(0));
    let misses = counts[0] as u32;
    let seconds = weighted(&counts.insert_axis(Axis(0)), &PENALTY_WEIGHTS)[0];
    (time, misses, seconds)
}

fn stage_cell(stage: &Stage, score: Option<&StageScore>) -> StageCell {
    let no_result = |display: &str| StageCell {
        stage_id: stage.id.clone(),
        value: STAGE_CAP,
        display: display.to_string(),
        detail: CellDetail::Sass(SassCell {
            time: 0.0,
            misses: 0,
            penalties: 0.0,
            result: false,
        }),
    };

    match score {
        Some(score) if score.dnf => no_result("DNF"),
        Some(StageScore {
            raw: RawScore::Strings { strings, penalties },
            ..
        }) => {
            let (time, misses, seconds) = breakdown(strings, penalties);
            if time <= 0.0 {
                return no_result("-");
            }
            let total = stage_total(time, seconds);
            StageCell {
                stage_id: stage.id.clone(),
                value: total,
                display: format!("{:.2}", total),
                detail: CellDetail::Sass(SassCell {
                    time,
                    misses,
                    penalties: seconds,
                    result: true,
                }),
            }
        }
        _ => no_result("-"),
    }
}

pub fn score(m: &Match) -> (BTreeMap<String, StageAggregate>, Vec<ShooterResult>) {
    let stages = m.active_stages();
    let mut aggregates: BTreeMap<String, StageAggregate> = stages
        .iter()
        .map(|stage| (stage.id.clone(), StageAggregate::default()))
        .collect();

    let results = m
        .active_shooters()
        .into_iter()
        .map(|shooter| {
            let cells: Vec<StageCell> = stages
                .iter()
                .map(|stage| stage_cell(stage, m.score(&stage.id, &shooter.id)))
                .collect();

            for cell in &cells {
                if let CellDetail::Sass(SassCell { result: true, .. }) = cell.detail {
                    if let Some(aggregate) = aggregates.get_mut(&cell.stage_id) {
                        aggregate.scored += 1;
                        aggregate.best =
                            Some(aggregate.best.map_or(cell.value, |b| b.min(cell.value)));
                    }
                }
            }

            let total: f64 = cells.iter().map(|c| c.value).sum();
            ShooterResult::new(shooter, cells, total, format!("{:.2}", total))
        })
        .collect();

    (aggregates, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MatchRegistry;

    #[test]
    fn test_breakdown_weights_penalty_columns() {
        let (time, misses, seconds) = breakdown(&[20.0, 5.5], &[vec![2, 0, 1, 0], vec![1, 1]]);

        assert_eq!(time, 25.5);
        assert_eq!(misses, 3);
        assert_eq!(seconds, 35.0);
    }

    #[test]
    fn test_total_is_capped() {
        assert_eq!(stage_total(250.0, 60.0), 300.0);
        assert_eq!(stage_total(25.0, 35.0), 60.0);
        assert_eq!(stage_total(0.0, 0.0), 300.0);
    }

    #[test]
    fn test_missing_and_zero_time_get_cap() {
        let definition = serde_json::from_str(
            r#"{"match_id": "m1", "match_subtype": "sass",
                "match_shooters": [{"sh_uid": "a"}, {"sh_uid": "b"}, {"sh_uid": "c"}],
                "match_stages": [{"stage_uuid": "st1"}]}"#,
        )
        .unwrap();
        let scores = serde_json::from_str(
            r#"{"match_scores": [{"stage_uuid": "st1", "stage_stagescores": [
                {"shtr": "a", "str": [30.0], "penss": [[1, 0, 0, 0]]},
                {"shtr": "b", "str": [0]}
            ]}]}"#,
        )
        .unwrap();
        let mut registry = MatchRegistry::default();
        registry.merge_match(&definition, Some(&scores));

        let (aggregates, results) = score(registry.get("m1").unwrap());

        let by_id = |id: &str| results.iter().find(|r| r.shooter_id == id).unwrap();
        assert_eq!(by_id("a").total, 35.0);
        assert_eq!(by_id("b").total, 300.0);
        assert_eq!(by_id("c").total, 300.0);
        assert_eq!(aggregates["st1"].best, Some(35.0));
    }
}
