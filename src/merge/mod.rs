//! Timestamp-gated merge of device reports into one canonical match graph.

pub mod entities;
pub mod matches;
pub mod registry;
pub mod report;

pub use entities::{RawScore, Shooter, Stage, StageRules, StageScore, TargetTable};
pub use matches::Match;
pub use registry::MatchRegistry;
pub use report::{MergeReport, Upsert};
