use ndarray::Array1;
use serde::Serialize;
use std::collections::BTreeMap;

use super::penalties::{penalty_matrix, string_times, weighted, CATEGORIES};
use super::{CellDetail, ShooterResult, StageAggregate, StageCell};
use crate::merge::entities::{DEFAULT_DROP_WORST, DEFAULT_STRINGS};
use crate::merge::{Match, RawScore, Stage, StageRules, StageScore};

/// Seconds added per penalty, by category.
pub const PENALTY_WEIGHTS: [f64; CATEGORIES] = [3.0, 3.0, 30.0, 4.0];
/// Ceiling for one penalized string; an unattempted string counts as this.
pub const STRING_CAP: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringsCell {
    /// Penalized, capped strings in shooting order
    pub strings: Vec<f64>,
    pub dropped: usize,
    pub result: bool,
}

/// Adds weighted penalties to each string and caps it. A zero raw time
/// means the string was not shot and takes the cap.
pub fn penalized_strings(strings: &[f64], penalties: &[Vec<u32>], count: usize) -> Array1<f64> {
    let times = string_times(strings, count);
    let penalty_seconds = weighted(&penalty_matrix(penalties, count), &PENALTY_WEIGHTS);

    let mut penalized = &times + &penalty_seconds;
    for (value, raw) in penalized.iter_mut().zip(times.iter()) {
        *value = if *raw == 0.0 { STRING_CAP } else { value.min(STRING_CAP) };
    }
    penalized
}

/// Sum of the strings after dropping the `drop_worst` slowest.
pub fn stage_time(strings: &Array1<f64>, drop_worst: usize) -> f64 {
    let mut sorted = strings.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.iter().skip(drop_worst).sum()
}

/// Value for a stage without a usable score: every counted string capped.
pub fn placeholder(strings: u32, drop_worst: u32) -> f64 {
    STRING_CAP * strings.saturating_sub(drop_worst) as f64
}

fn stage_shape(stage: &Stage) -> (u32, u32) {
    match stage.rules {
        StageRules::Strings { strings, drop_worst } => (strings, drop_worst),
        _ => (DEFAULT_STRINGS, DEFAULT_DROP_WORST),
    }
}

fn stage_cell(stage: &Stage, score: Option<&StageScore>) -> StageCell {
    let (count, drop_worst) = stage_shape(stage);
    let no_result = placeholder(count, drop_worst);

    let (value, display, detail) = match score {
        Some(score) if score.dnf => (no_result, "DNF".to_string(), None),
        Some(StageScore {
            raw: RawScore::Strings { strings, penalties },
            ..
        }) => {
            let penalized = penalized_strings(strings, penalties, count as usize);
            let time = stage_time(&penalized, drop_worst as usize);
            let detail = StringsCell {
                strings: penalized.to_vec(),
                dropped: drop_worst as usize,
                result: true,
            };
            (time, format!("{:.2}", time), Some(detail))
        }
        _ => (no_result, "-".to_string(), None),
    };

    StageCell {
        stage_id: stage.id.clone(),
        value,
        display,
        detail: CellDetail::Strings(detail.unwrap_or(StringsCell {
            strings: Vec::new(),
            dropped: drop_worst as usize,
            result: false,
        })),
    }
}

pub fn score(m: &Match) -> (BTreeMap<String, StageAggregate>, Vec<ShooterResult>) {
    let stages = m.active_stages();
    let shooters = m.active_shooters();

    let mut aggregates: BTreeMap<String, StageAggregate> = BTreeMap::new();
    let mut results = Vec::with_capacity(shooters.len());

    for shooter in shooters {
        let cells: Vec<StageCell> = stages
            .iter()
            .map(|stage| stage_cell(stage, m.score(&stage.id, &shooter.id)))
            .collect();

        for cell in &cells {
            if let CellDetail::Strings(StringsCell { result: true, .. }) = cell.detail {
                let aggregate = aggregates.entry(cell.stage_id.clone()).or_default();
                aggregate.scored += 1;
                aggregate.best = Some(aggregate.best.map_or(cell.value, |b| b.min(cell.value)));
            }
        }

        let total: f64 = cells.iter().map(|c| c.value).sum();
        let any_result = cells
            .iter()
            .any(|c| matches!(c.detail, CellDetail::Strings(StringsCell { result: true, .. })));
        let total_display = if any_result {
            format!("{:.2}", total)
        } else {
            "-".to_string()
        };
        results.push(ShooterResult::new(shooter, cells, total, total_display));
    }

    for stage in &stages {
        aggregates.entry(stage.id.clone()).or_default();
    }

    (aggregates, results)
}
