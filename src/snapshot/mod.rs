//! Read-only projections over the merged and scored state.

pub mod builder;
pub mod models;

pub use builder::{build_snapshot, match_view, stage_results};
pub use models::{
    DivisionView, MatchSummary, MatchView, Snapshot, StageParams, StageResults, StageRow,
    StageView,
};
