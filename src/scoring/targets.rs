use serde::Serialize;
use std::collections::BTreeMap;

use super::{CellDetail, ShooterResult, StageAggregate, StageCell};
use crate::merge::{Match, RawScore, Stage, StageRules, StageScore, TargetTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetsCell {
    pub hits: u32,
    pub percent: f64,
    pub result: bool,
}

/// Σ hits × weight over the stage's target table. Hits on sub-targets the
/// table does not define weigh nothing.
pub fn weighted_score(table: &TargetTable, hits: &BTreeMap<(String, String), u32>) -> f64 {
    hits.iter()
        .map(|((target, sub), count)| *count as f64 * table.weight(target, sub))
        .sum()
}

fn evaluate(stage: &Stage, score: &StageScore) -> Option<(f64, u32)> {
    let (StageRules::Targets(table), RawScore::Targets(hits)) = (&stage.rules, &score.raw) else {
        return None;
    };
    Some((weighted_score(table, hits), hits.values().sum()))
}

/// Pass 1: weighted sum per active shooter, and the stage best.
fn stage_aggregate(m: &Match, stage: &Stage) -> (StageAggregate, BTreeMap<String, (f64, u32)>) {
    let mut aggregate = StageAggregate::default();
    let mut sums = BTreeMap::new();

    for shooter in m.active_shooters() {
        let Some(score) = m.score(&stage.id, &shooter.id).filter(|s| !s.dnf) else {
            continue;
        };
        if let Some((value, hits)) = evaluate(stage, score) {
            aggregate.scored += 1;
            aggregate.best = Some(aggregate.best.map_or(value, |b| b.max(value)));
            sums.insert(shooter.id.clone(), (value, hits));
        }
    }

    (aggregate, sums)
}

pub fn score(m: &Match) -> (BTreeMap<String, StageAggregate>, Vec<ShooterResult>) {
    let stages = m.active_stages();
    let mut aggregates = BTreeMap::new();
    let mut sums = BTreeMap::new();
    for stage in &stages {
        let (aggregate, stage_sums) = stage_aggregate(m, stage);
        aggregates.insert(stage.id.clone(), aggregate);
        sums.insert(stage.id.clone(), stage_sums);
    }

    let results = m
        .active_shooters()
        .into_iter()
        .map(|shooter| {
            let cells: Vec<StageCell> = stages
                .iter()
                .map(|stage| {
                    let best = aggregates.get(&stage.id).and_then(|a| a.best).unwrap_or(0.0);
                    let computed = sums.get(&stage.id).and_then(|s| s.get(&shooter.id));
                    let dnf = m.score(&stage.id, &shooter.id).is_some_and(|s| s.dnf);

                    let (value, display, detail) = match computed {
                        Some(&(value, hits)) => {
                            let percent = if best > 0.0 { value / best * 100.0 } else { 0.0 };
                            (value, format_score(value), TargetsCell { hits, percent, result: true })
                        }
                        None => {
                            let display = if dnf { "DNF" } else { "-" };
                            let empty = TargetsCell { hits: 0, percent: 0.0, result: false };
                            (0.0, display.to_string(), empty)
                        }
                    };
                    StageCell {
                        stage_id: stage.id.clone(),
                        value,
                        display,
                        detail: CellDetail::Targets(detail),
                    }
                })
                .collect();

            let total: f64 = cells.iter().map(|c| c.value).sum();
            ShooterResult::new(shooter, cells, total, format_score(total))
        })
        .collect();

    (aggregates, results)
}

fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
