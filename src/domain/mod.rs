pub mod discipline;
pub mod lenient;
pub mod models;
pub mod timestamp;

pub use discipline::{Discipline, RankOrder};
pub use models::{
    CustomTargetRecord, MatchDefinition, MatchScores, PenaltyDefinition, PowerFactor,
    ShooterRecord, StageRecord, StageScoreRecord, StageScores, StatusDocument, StatusRequest,
    TargetHitsRecord,
};
pub use timestamp::{is_newer, ModifiedAt};
