use serde::Serialize;

use crate::device::DeviceStatus;
use crate::domain::{Discipline, ModifiedAt, PenaltyDefinition};
use crate::scoring::{ShooterResult, StageAggregate, StageCell};

/// Everything the display layer needs, built once per tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub generated_at: String,
    pub matches: Vec<MatchView>,
    /// Matches of an unrecognised discipline, listed but never ranked
    pub unranked: Vec<MatchSummary>,
    pub devices: Vec<DeviceStatus>,
}

impl Snapshot {
    pub fn find_match(&self, match_id: &str) -> Option<&MatchView> {
        self.matches.iter().find(|m| m.id == match_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub id: String,
    pub name: String,
    pub sub_type: String,
    pub shooters: usize,
    pub stages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchView {
    pub id: String,
    pub name: String,
    pub discipline: Discipline,
    pub sub_type: String,
    pub modified: Option<ModifiedAt>,
    /// Named penalty values configured for the match
    pub penalties: Vec<PenaltyDefinition>,
    pub stages: Vec<StageView>,
    /// All ranked shooters, best first
    pub combined: Vec<ShooterResult>,
    pub divisions: Vec<DivisionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageView {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub short_name: String,
    pub params: StageParams,
    pub aggregate: StageAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageParams {
    Ipsc {
        poppers: u32,
        required_shots: u32,
        max_points: f64,
    },
    Strings {
        strings: u32,
        drop_worst: u32,
    },
    Targets {
        targets: Vec<TargetView>,
    },
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetView {
    pub id: String,
    pub name: String,
    pub weights: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivisionView {
    pub name: String,
    pub short_name: String,
    pub shooters: Vec<ShooterResult>,
}

/// One stage's results across all ranked shooters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResults {
    pub match_id: String,
    pub match_name: String,
    pub stage: StageView,
    pub rows: Vec<StageRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRow {
    pub place: usize,
    pub shooter_id: String,
    pub name: String,
    pub division: String,
    pub short_division: String,
    /// Score signed off on the terminal
    pub approved: bool,
    pub cell: StageCell,
}
