use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;

use super::{CellDetail, ShooterResult, StageAggregate, StageCell};
use crate::domain::{PowerFactor, StageScoreRecord};
use crate::merge::{Match, RawScore, Stage, StageScore};

pub const PROCEDURAL_PENALTY: f64 = 10.0;

/// Hit counts per zone, summed over every target and popper of a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitCounts {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "D")]
    pub d: u32,
    #[serde(rename = "NS")]
    pub no_shoot: u32,
    #[serde(rename = "M")]
    pub miss: u32,
    #[serde(rename = "NPM")]
    pub no_penalty_miss: u32,
    #[serde(rename = "Proc")]
    pub procedurals: u32,
}

impl HitCounts {
    /// Unpacks one target value: one 4-bit count per zone, A in the
    /// lowest nibble, then B, C, D, NS, M, NPM.
    pub fn decode(packed: u32) -> Self {
        let nibble = |shift: u32| (packed >> shift) & 0xf;
        Self {
            a: nibble(0),
            b: nibble(4),
            c: nibble(8),
            d: nibble(12),
            no_shoot: nibble(16),
            miss: nibble(20),
            no_penalty_miss: nibble(24),
            procedurals: 0,
        }
    }

    pub fn from_record(record: &StageScoreRecord) -> Self {
        let mut hits = Self {
            a: record.poph,
            miss: record.popm,
            no_shoot: record.popns,
            procedurals: record
                .proc_cnts
                .iter()
                .flat_map(|counts| counts.values())
                .sum(),
            ..Self::default()
        };
        for packed in &record.ts {
            hits += Self::decode(*packed);
        }
        hits
    }

    pub fn points(&self, pf: &PowerFactor) -> f64 {
        self.a as f64 * pf.a + self.b as f64 * pf.b + self.c as f64 * pf.c + self.d as f64 * pf.d
    }

    pub fn penalties(&self, pf: &PowerFactor) -> f64 {
        self.miss as f64 * pf.miss
            + self.no_shoot as f64 * pf.no_shoot
            + self.procedurals as f64 * PROCEDURAL_PENALTY
    }
}

impl AddAssign for HitCounts {
    fn add_assign(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
        self.d += other.d;
        self.no_shoot += other.no_shoot;
        self.miss += other.miss;
        self.no_penalty_miss += other.no_penalty_miss;
        self.procedurals += other.procedurals;
    }
}

/// Hit factor floored at zero; zero when no time was recorded.
pub fn hit_factor(points: f64, penalties: f64, time: f64) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    (points - penalties).max(0.0) / time
}

/// Display state of one IPSC stage cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IpscState {
    Scored,
    Zero,
    NoTime,
    Dnf,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpscCell {
    pub state: IpscState,
    pub hit_factor: f64,
    pub hit_factor_string: String,
    pub points: f64,
    pub points_string: String,
    pub penalties: f64,
    pub time: f64,
    pub time_string: String,
    pub stage_percent: f64,
    pub stage_percent_string: String,
    pub match_points: f64,
    pub match_points_string: String,
    pub hits: Option<HitCounts>,
}

/// Points, penalties and time of one score under its shooter's power factor.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Evaluated {
    hits: HitCounts,
    points: f64,
    penalties: f64,
    time: f64,
    hit_factor: f64,
}

fn evaluate(m: &Match, score: &StageScore) -> Option<Evaluated> {
    let RawScore::Ipsc { hits, time } = &score.raw else {
        return None;
    };
    let default_pf = PowerFactor::default();
    let pf = m
        .shooters
        .get(&score.shooter_id)
        .and_then(|shooter| m.power_factor(&shooter.power_factor))
        .unwrap_or(&default_pf);

    let points = hits.points(pf);
    let penalties = hits.penalties(pf);
    Some(Evaluated {
        hits: *hits,
        points,
        penalties,
        time: *time,
        hit_factor: hit_factor(points, penalties, *time),
    })
}

/// Pass 1: best hit factor per division on one stage. DNF scores and
/// inactive shooters do not count.
fn stage_aggregate(m: &Match, stage: &Stage) -> StageAggregate {
    let mut aggregate = StageAggregate::default();

    for shooter in m.active_shooters() {
        let Some(score) = m.score(&stage.id, &shooter.id) else {
            continue;
        };
        if score.dnf {
            continue;
        }
        let Some(evaluated) = evaluate(m, score) else {
            continue;
        };

        aggregate.scored += 1;
        let division_best = aggregate
            .max_hit_factors
            .entry(shooter.division.clone())
            .or_insert(0.0);
        *division_best = division_best.max(evaluated.hit_factor);
        aggregate.best = Some(aggregate.best.unwrap_or(0.0).max(evaluated.hit_factor));
    }

    aggregate
}

/// Pass 2: one shooter's cell on one stage.
fn stage_cell(m: &Match, stage: &Stage, score: Option<&StageScore>, division_max: f64) -> StageCell {
    let evaluated = score.and_then(|s| evaluate(m, s).map(|e| (s.dnf, e)));

    let cell = match evaluated {
        None => placeholder_cell(IpscState::Missing, "-", None),
        Some((true, e)) => placeholder_cell(IpscState::Dnf, "DNF", Some(e.hits)),
        Some((false, e)) if e.time == 0.0 => placeholder_cell(IpscState::NoTime, "-", Some(e.hits)),
        Some((false, e)) if e.hit_factor == 0.0 || division_max == 0.0 => IpscCell {
            state: IpscState::Zero,
            hit_factor: 0.0,
            hit_factor_string: format!("{:.4}", 0.0),
            points: 0.0,
            points_string: "0".to_string(),
            penalties: e.penalties,
            time: e.time,
            time_string: format!("{:.2}", e.time),
            stage_percent: 0.0,
            stage_percent_string: format!("{:.2} %", 0.0),
            match_points: 0.0,
            match_points_string: format!("{:.4}", 0.0),
            hits: Some(e.hits),
        },
        Some((false, e)) => {
            let ratio = e.hit_factor / division_max;
            let match_points = ratio * stage.max_points();
            IpscCell {
                state: IpscState::Scored,
                hit_factor: e.hit_factor,
                hit_factor_string: format!("{:.4}", e.hit_factor),
                points: e.points,
                points_string: format!("{}", e.points),
                penalties: e.penalties,
                time: e.time,
                time_string: format!("{:.2}", e.time),
                stage_percent: ratio * 100.0,
                stage_percent_string: format!("{:.2} %", ratio * 100.0),
                match_points,
                match_points_string: format!("{:.4}", match_points),
                hits: Some(e.hits),
            }
        }
    };

    StageCell {
        stage_id: stage.id.clone(),
        value: cell.match_points,
        display: cell.hit_factor_string.clone(),
        detail: CellDetail::Ipsc(cell),
    }
}

fn placeholder_cell(state: IpscState, text: &str, hits: Option<HitCounts>) -> IpscCell {
    IpscCell {
        state,
        hit_factor: 0.0,
        hit_factor_string: text.to_string(),
        points: 0.0,
        points_string: text.to_string(),
        penalties: 0.0,
        time: 0.0,
        time_string: text.to_string(),
        stage_percent: 0.0,
        stage_percent_string: text.to_string(),
        match_points: 0.0,
        match_points_string: text.to_string(),
        hits,
    }
}

pub fn score(m: &Match) -> (BTreeMap<String, StageAggregate>, Vec<ShooterResult>) {
    let stages = m.active_stages();
    let aggregates: BTreeMap<String, StageAggregate> = stages
        .iter()
        .map(|stage| (stage.id.clone(), stage_aggregate(m, stage)))
        .collect();

    let results = m
        .active_shooters()
        .into_iter()
        .map(|shooter| {
            let cells: Vec<StageCell> = stages
                .iter()
                .map(|stage| {
                    let division_max = aggregates
                        .get(&stage.id)
                        .and_then(|a| a.max_hit_factors.get(&shooter.division))
                        .copied()
                        .unwrap_or(0.0);
                    stage_cell(m, stage, m.score(&stage.id, &shooter.id), division_max)
                })
                .collect();
            let total: f64 = cells.iter().map(|c| c.value).sum();
            ShooterResult::new(shooter, cells, total, format!("{:.4}", total))
        })
        .collect();

    (aggregates, results)
}
