use std::collections::BTreeMap;

use crate::config::DisplaySettings;
use crate::domain::{
    CustomTargetRecord, Discipline, ModifiedAt, ShooterRecord, StageRecord, StageScoreRecord,
};
use crate::scoring::ipsc::HitCounts;

/// Standard SCSA stage: five strings, the worst one dropped.
pub const DEFAULT_STRINGS: u32 = 5;
pub const DEFAULT_DROP_WORST: u32 = 1;
/// Upper bound on strings per stage; scoring allocates per string.
pub const MAX_STRINGS: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Shooter {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub division: String,
    pub short_division: String,
    /// Power factor name (IPSC only)
    pub power_factor: String,
    pub deleted: bool,
    pub disqualified: bool,
    pub modified: Option<ModifiedAt>,
}

impl Shooter {
    pub fn from_record(record: &ShooterRecord, display: &DisplaySettings) -> Self {
        let mut shooter = Self {
            id: record.sh_uid.clone(),
            first_name: String::new(),
            last_name: String::new(),
            division: String::new(),
            short_division: String::new(),
            power_factor: String::new(),
            deleted: false,
            disqualified: false,
            modified: None,
        };
        shooter.apply(record, display);
        shooter
    }

    pub fn apply(&mut self, record: &ShooterRecord, display: &DisplaySettings) {
        self.first_name = record.sh_fn.clone();
        self.last_name = record.sh_ln.clone();
        self.division = record.sh_dvp.clone();
        self.short_division = display.short_division(&record.sh_dvp);
        self.power_factor = record.sh_pf.clone();
        self.deleted = record.sh_del;
        self.disqualified = record.sh_dq;
        self.modified = record.sh_mod;
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Deleted and disqualified shooters stay in the match but are not ranked.
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.disqualified
    }
}

/// Discipline-specific stage parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRules {
    Ipsc { poppers: u32, required_shots: u32 },
    Strings { strings: u32, drop_worst: u32 },
    Targets(TargetTable),
    Plain,
}

impl StageRules {
    fn from_record(discipline: Discipline, record: &StageRecord) -> Self {
        match discipline {
            Discipline::Ipsc => {
                let target_shots: u32 = record.stage_targets.iter().map(|t| t.target_reqshots).sum();
                StageRules::Ipsc {
                    poppers: record.stage_poppers,
                    required_shots: record.stage_poppers + target_shots,
                }
            }
            Discipline::Scsa => {
                let strings = record
                    .stage_strings
                    .unwrap_or(DEFAULT_STRINGS)
                    .min(MAX_STRINGS);
                let drop_worst = record
                    .stage_removeworststring
                    .map(|d| d.count())
                    .unwrap_or(DEFAULT_DROP_WORST)
                    .min(strings);
                StageRules::Strings { strings, drop_worst }
            }
            Discipline::Nra | Discipline::Silhouette => {
                StageRules::Targets(TargetTable::from_records(&record.stage_customtargets))
            }
            Discipline::Sass | Discipline::Unknown => StageRules::Plain,
        }
    }
}

/// Weighted sub-targets of an NRA / Silhouette stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetTable {
    pub targets: Vec<CustomTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomTarget {
    pub id: String,
    pub name: String,
    pub weights: BTreeMap<String, f64>,
}

impl TargetTable {
    pub fn from_records(records: &[CustomTargetRecord]) -> Self {
        let targets = records
            .iter()
            .map(|record| CustomTarget {
                id: record.ctgt_id.clone(),
                name: record.ctgt_name.clone(),
                weights: record
                    .ctgt_subs
                    .iter()
                    .map(|sub| (sub.name.clone(), sub.value))
                    .collect(),
            })
            .collect();
        Self { targets }
    }

    pub fn weight(&self, target_id: &str, sub_target: &str) -> f64 {
        self.targets
            .iter()
            .find(|t| t.id == target_id)
            .and_then(|t| t.weights.get(sub_target))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub short_name: String,
    pub deleted: bool,
    pub modified: Option<ModifiedAt>,
    pub rules: StageRules,
}

impl Stage {
    pub fn from_record(
        discipline: Discipline,
        record: &StageRecord,
        display: &DisplaySettings,
    ) -> Self {
        let mut stage = Self {
            id: record.stage_uuid.clone(),
            number: 0,
            name: String::new(),
            short_name: String::new(),
            deleted: false,
            modified: None,
            rules: StageRules::Plain,
        };
        stage.apply(discipline, record, display);
        stage
    }

    pub fn apply(&mut self, discipline: Discipline, record: &StageRecord, display: &DisplaySettings) {
        self.number = record.stage_number;
        self.name = record.stage_name.clone();
        self.short_name = display.short_stage_name(&record.stage_name);
        self.deleted = record.stage_deleted;
        self.modified = record.stage_modifieddate;
        self.rules = StageRules::from_record(discipline, record);
    }

    /// IPSC stage value: five points per required shot.
    pub fn max_points(&self) -> f64 {
        match self.rules {
            StageRules::Ipsc { required_shots, .. } => 5.0 * required_shots as f64,
            _ => 0.0,
        }
    }
}

/// Raw per-stage performance, shaped by discipline.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScore {
    Ipsc { hits: HitCounts, time: f64 },
    /// String times plus one penalty-count row per string (SCSA, SASS)
    Strings { strings: Vec<f64>, penalties: Vec<Vec<u32>> },
    /// Hits per (target id, sub-target name)
    Targets(BTreeMap<(String, String), u32>),
    Plain,
}

impl RawScore {
    fn from_record(discipline: Discipline, record: &StageScoreRecord) -> Self {
        match discipline {
            Discipline::Ipsc => RawScore::Ipsc {
                hits: HitCounts::from_record(record),
                time: record.strings.iter().sum(),
            },
            Discipline::Scsa | Discipline::Sass => RawScore::Strings {
                strings: record.strings.clone(),
                penalties: record.penss.clone(),
            },
            Discipline::Nra | Discipline::Silhouette => RawScore::Targets(
                record
                    .ctgts
                    .iter()
                    .flat_map(|target| {
                        target
                            .hits
                            .iter()
                            .map(move |(sub, count)| ((target.tgt.clone(), sub.clone()), *count))
                    })
                    .collect(),
            ),
            Discipline::Unknown => RawScore::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageScore {
    pub stage_id: String,
    pub shooter_id: String,
    pub dnf: bool,
    pub approved: bool,
    pub modified: Option<ModifiedAt>,
    pub raw: RawScore,
}

impl StageScore {
    pub fn from_record(discipline: Discipline, stage_id: &str, record: &StageScoreRecord) -> Self {
        let mut score = Self {
            stage_id: stage_id.to_string(),
            shooter_id: record.shtr.clone(),
            dnf: false,
            approved: false,
            modified: None,
            raw: RawScore::Plain,
        };
        score.apply(discipline, record);
        score
    }

    pub fn apply(&mut self, discipline: Discipline, record: &StageScoreRecord) {
        self.dnf = record.dnf;
        self.approved = record.aprv;
        self.modified = record.modified;
        self.raw = RawScore::from_record(discipline, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{StringDrop, SubTargetRecord, TargetHitsRecord, TargetRecord};

    #[test]
    fn test_ipsc_stage_required_shots_and_max_points() {
        let record = StageRecord {
            stage_uuid: "st1".into(),
            stage_poppers: 2,
            stage_targets: vec![
                TargetRecord { target_reqshots: 2 },
                TargetRecord { target_reqshots: 4 },
            ],
            ..StageRecord::default()
        };

        let stage = Stage::from_record(Discipline::Ipsc, &record, &DisplaySettings::default());

        assert_eq!(stage.rules, StageRules::Ipsc { poppers: 2, required_shots: 8 });
        assert_eq!(stage.max_points(), 40.0);
    }

    #[test]
    fn test_scsa_stage_defaults_and_flag() {
        let mut record = StageRecord {
            stage_uuid: "st1".into(),
            ..StageRecord::default()
        };
        let display = DisplaySettings::default();

        let stage = Stage::from_record(Discipline::Scsa, &record, &display);
        assert_eq!(stage.rules, StageRules::Strings { strings: 5, drop_worst: 1 });

        record.stage_removeworststring = Some(StringDrop::Flag(false));
        record.stage_strings = Some(4);
        let stage = Stage::from_record(Discipline::Scsa, &record, &display);
        assert_eq!(stage.rules, StageRules::Strings { strings: 4, drop_worst: 0 });
    }

    #[test]
    fn test_scsa_string_count_is_bounded() {
        let record = StageRecord {
            stage_uuid: "st1".into(),
            stage_strings: Some(4_000_000_000),
            stage_removeworststring: Some(StringDrop::Count(4_000_000_000)),
            ..StageRecord::default()
        };

        let stage = Stage::from_record(Discipline::Scsa, &record, &DisplaySettings::default());

        assert_eq!(
            stage.rules,
            StageRules::Strings { strings: MAX_STRINGS, drop_worst: MAX_STRINGS }
        );
    }

    #[test]
    fn test_stage_short_name_uses_substitutions() {
        let mut display = DisplaySettings::default();
        display
            .stage_names
            .insert("W1 CB: The Pendulum".to_string(), "The Pendulum".to_string());
        let record = StageRecord {
            stage_uuid: "st1".into(),
            stage_name: "W1 CB: The Pendulum".into(),
            ..StageRecord::default()
        };

        let stage = Stage::from_record(Discipline::Scsa, &record, &display);

        assert_eq!(stage.name, "W1 CB: The Pendulum");
        assert_eq!(stage.short_name, "The Pendulum");
    }

    #[test]
    fn test_target_table_weight_lookup() {
        let table = TargetTable::from_records(&[CustomTargetRecord {
            ctgt_id: "t1".into(),
            ctgt_name: "Chicken".into(),
            ctgt_subs: vec![SubTargetRecord { name: "hit".into(), value: 1.0 }],
        }]);

        assert_eq!(table.weight("t1", "hit"), 1.0);
        assert_eq!(table.weight("t1", "miss"), 0.0);
        assert_eq!(table.weight("t2", "hit"), 0.0);
    }

    #[test]
    fn test_target_hits_are_keyed_by_target_and_sub() {
        let record = StageScoreRecord {
            shtr: "s1".into(),
            ctgts: vec![TargetHitsRecord {
                tgt: "t1".into(),
                hits: [("X".to_string(), 3), ("10".to_string(), 2)].into_iter().collect(),
            }],
            ..StageScoreRecord::default()
        };

        let score = StageScore::from_record(Discipline::Nra, "st1", &record);

        let RawScore::Targets(hits) = score.raw else {
            panic!("expected target hits");
        };
        assert_eq!(hits.get(&("t1".to_string(), "X".to_string())), Some(&3));
        assert_eq!(hits.get(&("t1".to_string(), "10".to_string())), Some(&2));
    }

    #[test]
    fn test_shooter_name_and_activity() {
        let record = ShooterRecord {
            sh_uid: "s1".into(),
            sh_fn: "Ada".into(),
            sh_ln: "Lovelace".into(),
            sh_dq: true,
            ..ShooterRecord::default()
        };

        let shooter = Shooter::from_record(&record, &DisplaySettings::default());

        assert_eq!(shooter.name(), "Ada Lovelace");
        assert!(!shooter.is_active());
    }
}
