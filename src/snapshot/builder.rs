use chrono::Local;

use super::models::{
    DivisionView, MatchSummary, MatchView, Snapshot, StageParams, StageResults, StageRow,
    StageView, TargetView,
};
use crate::device::DeviceStatus;
use crate::merge::{Match, MatchRegistry, Stage, StageRules};
use crate::scoring::rank::compare_totals;
use crate::scoring::{score_match, ScoredMatch};

/// Scores every match and assembles the full read model.
pub fn build_snapshot(registry: &MatchRegistry, devices: Vec<DeviceStatus>) -> Snapshot {
    let mut snapshot = Snapshot {
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        devices,
        ..Snapshot::default()
    };

    for m in registry.matches() {
        if m.is_ranked() {
            snapshot.matches.push(match_view(m));
        } else {
            snapshot.unranked.push(summary(m));
        }
    }

    snapshot
}

/// Freshly scored view of one match.
pub fn match_view(m: &Match) -> MatchView {
    let scored = score_match(m);
    let stages = m
        .active_stages()
        .into_iter()
        .map(|stage| stage_view(stage, &scored))
        .collect();

    MatchView {
        id: m.id.clone(),
        name: m.name.clone(),
        discipline: m.discipline,
        sub_type: m.subtype.clone(),
        modified: m.modified,
        penalties: m.penalties.clone(),
        stages,
        divisions: division_views(&scored),
        combined: scored.results,
    }
}

/// Freshly scored results of one stage, ordered by that stage alone.
pub fn stage_results(m: &Match, stage_id: &str) -> Option<StageResults> {
    let stage = m.stages.get(stage_id).filter(|s| !s.deleted)?;
    let scored = score_match(m);

    let mut rows: Vec<StageRow> = scored
        .results
        .iter()
        .filter_map(|result| {
            result.cell(stage_id).map(|cell| StageRow {
                place: 0,
                shooter_id: result.shooter_id.clone(),
                name: result.name.clone(),
                division: result.division.clone(),
                short_division: result.short_division.clone(),
                approved: m
                    .score(stage_id, &result.shooter_id)
                    .is_some_and(|score| score.approved),
                cell: cell.clone(),
            })
        })
        .collect();

    let order = m.discipline.rank_order();
    rows.sort_by(|a, b| {
        compare_totals(a.cell.value, b.cell.value, order)
            .then_with(|| a.shooter_id.cmp(&b.shooter_id))
    });
    for (index, row) in rows.iter_mut().enumerate() {
        row.place = index + 1;
    }

    Some(StageResults {
        match_id: m.id.clone(),
        match_name: m.name.clone(),
        stage: stage_view(stage, &scored),
        rows,
    })
}

// --- Helper Methods ---

fn summary(m: &Match) -> MatchSummary {
    MatchSummary {
        id: m.id.clone(),
        name: m.name.clone(),
        sub_type: m.subtype.clone(),
        shooters: m.shooters.len(),
        stages: m.stages.len(),
    }
}

fn stage_view(stage: &Stage, scored: &ScoredMatch) -> StageView {
    StageView {
        id: stage.id.clone(),
        number: stage.number,
        name: stage.name.clone(),
        short_name: stage.short_name.clone(),
        params: stage_params(stage),
        aggregate: scored
            .stages
            .get(&stage.id)
            .cloned()
            .unwrap_or_default(),
    }
}

fn stage_params(stage: &Stage) -> StageParams {
    match &stage.rules {
        StageRules::Ipsc {
            poppers,
            required_shots,
        } => StageParams::Ipsc {
            poppers: *poppers,
            required_shots: *required_shots,
            max_points: stage.max_points(),
        },
        StageRules::Strings {
            strings,
            drop_worst,
        } => StageParams::Strings {
            strings: *strings,
            drop_worst: *drop_worst,
        },
        StageRules::Targets(table) => StageParams::Targets {
            targets: table
                .targets
                .iter()
                .map(|t| TargetView {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    weights: t.weights.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                })
                .collect(),
        },
        StageRules::Plain => StageParams::Plain,
    }
}

fn division_views(scored: &ScoredMatch) -> Vec<DivisionView> {
    scored
        .divisions()
        .into_iter()
        .map(|division| {
            let shooters: Vec<_> = scored.division(division).into_iter().cloned().collect();
            let short_name = shooters
                .first()
                .map(|s| s.short_division.clone())
                .unwrap_or_else(|| division.to_string());
            DivisionView {
                name: division.to_string(),
                short_name,
                shooters,
            }
        })
        .collect()
}
