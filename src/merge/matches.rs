use log::info;
use std::collections::BTreeMap;

use super::entities::{Shooter, Stage, StageScore};
use super::report::{MergeReport, Upsert};
use crate::config::DisplaySettings;
use crate::domain::{
    is_newer, Discipline, MatchDefinition, MatchScores, ModifiedAt, PenaltyDefinition,
    PowerFactor, ShooterRecord, StageRecord, StageScoreRecord,
};

/// Canonical merged state of one competition.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    pub name: String,
    pub modified: Option<ModifiedAt>,
    /// Follows the newest definition's `match_subtype`
    pub discipline: Discipline,
    pub subtype: String,
    pub divisions: Vec<String>,
    /// Keyed by lowercased power factor name
    pub power_factors: BTreeMap<String, PowerFactor>,
    pub penalties: Vec<PenaltyDefinition>,
    pub shooters: BTreeMap<String, Shooter>,
    pub stages: BTreeMap<String, Stage>,
    /// stage id -> shooter id -> score
    pub scores: BTreeMap<String, BTreeMap<String, StageScore>>,
}

impl Match {
    pub fn new(definition: &MatchDefinition) -> Self {
        let mut new_match = Self {
            id: definition.match_id.clone(),
            name: String::new(),
            modified: None,
            discipline: Discipline::from_tag(&definition.match_subtype),
            subtype: definition.match_subtype.clone(),
            divisions: Vec::new(),
            power_factors: BTreeMap::new(),
            penalties: Vec::new(),
            shooters: BTreeMap::new(),
            stages: BTreeMap::new(),
            scores: BTreeMap::new(),
        };
        new_match.apply_definition(definition);
        new_match
    }

    /// Applies one device report. Each entity is replaced only when the
    /// incoming modification stamp is strictly later than the stored one.
    pub fn merge(
        &mut self,
        definition: &MatchDefinition,
        scores: Option<&MatchScores>,
        display: &DisplaySettings,
    ) -> MergeReport {
        let mut report = MergeReport::default();

        if is_newer(definition.match_modifieddate, self.modified) {
            self.apply_definition(definition);
            report.record(Upsert::Updated);
        }

        for record in &definition.match_shooters {
            report.record(self.upsert_shooter(record, display));
        }

        for record in &definition.match_stages {
            report.record(self.upsert_stage(record, display));
        }

        if let Some(scores) = scores {
            for stage_scores in &scores.match_scores {
                for record in &stage_scores.stage_stagescores {
                    report.record(self.upsert_score(&stage_scores.stage_uuid, record));
                }
            }
        }

        report
    }

    pub fn is_ranked(&self) -> bool {
        self.discipline.is_ranked()
    }

    pub fn score(&self, stage_id: &str, shooter_id: &str) -> Option<&StageScore> {
        self.scores.get(stage_id).and_then(|s| s.get(shooter_id))
    }

    /// Non-deleted stages ordered by stage number, then id.
    pub fn active_stages(&self) -> Vec<&Stage> {
        let mut stages: Vec<&Stage> = self.stages.values().filter(|s| !s.deleted).collect();
        stages.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
        stages
    }

    pub fn active_shooters(&self) -> Vec<&Shooter> {
        self.shooters.values().filter(|s| s.is_active()).collect()
    }

    pub fn power_factor(&self, name: &str) -> Option<&PowerFactor> {
        self.power_factors.get(&name.to_lowercase())
    }

    // --- Helper Methods ---

    fn apply_definition(&mut self, definition: &MatchDefinition) {
        let discipline = Discipline::from_tag(&definition.match_subtype);
        if discipline != self.discipline {
            // Stage rules and raw scores are shaped by the discipline; they
            // are rebuilt from this and later reports.
            info!(
                "Match {} changed discipline {} -> {}",
                self.id,
                self.discipline.as_str(),
                discipline.as_str()
            );
            self.discipline = discipline;
            self.stages.clear();
            self.scores.clear();
        }
        self.subtype = definition.match_subtype.clone();
        self.name = definition.match_name.clone();
        self.modified = definition.match_modifieddate;
        self.divisions = definition.match_cats.clone();
        self.power_factors = definition
            .match_pfs
            .iter()
            .map(|pf| (pf.name.to_lowercase(), pf.clone()))
            .collect();
        self.penalties = definition.match_penalties.clone();
    }

    fn upsert_shooter(&mut self, record: &ShooterRecord, display: &DisplaySettings) -> Upsert {
        if record.sh_uid.is_empty() {
            return Upsert::Skipped;
        }

        match self.shooters.get_mut(&record.sh_uid) {
            Some(existing) if is_newer(record.sh_mod, existing.modified) => {
                existing.apply(record, display);
                Upsert::Updated
            }
            Some(_) => Upsert::Stale,
            None => {
                self.shooters
                    .insert(record.sh_uid.clone(), Shooter::from_record(record, display));
                Upsert::Inserted
            }
        }
    }

    fn upsert_stage(&mut self, record: &StageRecord, display: &DisplaySettings) -> Upsert {
        if record.stage_uuid.is_empty() {
            return Upsert::Skipped;
        }

        let discipline = self.discipline;
        match self.stages.get_mut(&record.stage_uuid) {
            Some(existing) if is_newer(record.stage_modifieddate, existing.modified) => {
                existing.apply(discipline, record, display);
                Upsert::Updated
            }
            Some(_) => Upsert::Stale,
            None => {
                self.stages.insert(
                    record.stage_uuid.clone(),
                    Stage::from_record(discipline, record, display),
                );
                Upsert::Inserted
            }
        }
    }

    /// Scores may arrive before their stage or shooter is known; they are
    /// stored regardless.
    fn upsert_score(&mut self, stage_id: &str, record: &StageScoreRecord) -> Upsert {
        if stage_id.is_empty() || record.shtr.is_empty() {
            return Upsert::Skipped;
        }

        let discipline = self.discipline;
        let stage_scores = self.scores.entry(stage_id.to_string()).or_default();
        match stage_scores.get_mut(&record.shtr) {
            Some(existing) if is_newer(record.modified, existing.modified) => {
                existing.apply(discipline, record);
                Upsert::Updated
            }
            Some(_) => Upsert::Stale,
            None => {
                stage_scores.insert(
                    record.shtr.clone(),
                    StageScore::from_record(discipline, stage_id, record),
                );
                Upsert::Inserted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::entities::{RawScore, StageRules};

    fn definition(json: &str) -> MatchDefinition {
        serde_json::from_str(json).unwrap()
    }

    fn scores(json: &str) -> MatchScores {
        serde_json::from_str(json).unwrap()
    }

    const BASE: &str = r#"{
        "match_id": "m1",
        "match_name": "Club Night",
        "match_modifieddate": "2024-05-01 09:00:00",
        "match_subtype": "ipsc",
        "match_cats": ["Open", "Production"],
        "match_pfs": [{"name": "Minor", "A": 5, "C": 3, "D": 1, "M": 10, "NS": 10}],
        "match_shooters": [
            {"sh_uid": "s1", "sh_fn": "Ada", "sh_ln": "Lovelace", "sh_dvp": "Open", "sh_mod": "2024-05-01 09:00:00"}
        ],
        "match_stages": [
            {"stage_uuid": "st1", "stage_number": 1, "stage_name": "One", "stage_modifieddate": "2024-05-01 09:00:00"}
        ]
    }"#;

    #[test]
    fn test_new_match_takes_discipline_and_power_factors() {
        let m = Match::new(&definition(BASE));

        assert_eq!(m.discipline, Discipline::Ipsc);
        assert_eq!(m.name, "Club Night");
        assert_eq!(m.divisions, vec!["Open", "Production"]);
        assert_eq!(m.power_factor("MINOR").map(|pf| pf.a), Some(5.0));
    }

    #[test]
    fn test_first_merge_inserts_entities() {
        let def = definition(BASE);
        let mut m = Match::new(&def);

        let report = m.merge(&def, None, &DisplaySettings::default());

        assert_eq!(report.inserted, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(m.shooters["s1"].name(), "Ada Lovelace");
        assert_eq!(m.stages["st1"].name, "One");
    }

    #[test]
    fn test_equal_stamp_is_stale() {
        let def = definition(BASE);
        let mut m = Match::new(&def);
        let display = DisplaySettings::default();
        m.merge(&def, None, &display);

        let mut renamed = def.clone();
        renamed.match_shooters[0].sh_fn = "Grace".to_string();
        let report = m.merge(&renamed, None, &display);

        assert_eq!(report.stale, 2);
        assert_eq!(m.shooters["s1"].first_name, "Ada");
    }

    #[test]
    fn test_score_for_unknown_stage_and_shooter_is_kept() {
        let def = definition(BASE);
        let mut m = Match::new(&def);
        let sc = scores(
            r#"{"match_scores": [{"stage_uuid": "st9", "stage_stagescores": [{"shtr": "s9", "str": [12.5]}]}]}"#,
        );

        let report = m.merge(&def, Some(&sc), &DisplaySettings::default());

        assert_eq!(report.inserted, 3);
        assert!(m.score("st9", "s9").is_some());
        assert!(!m.stages.contains_key("st9"));
    }

    #[test]
    fn test_entities_without_id_are_skipped() {
        let def = definition(r#"{"match_id": "m1", "match_shooters": [{"sh_uid": ""}]}"#);
        let mut m = Match::new(&def);

        let report = m.merge(&def, None, &DisplaySettings::default());

        assert_eq!(report, MergeReport::default());
        assert!(m.shooters.is_empty());
    }

    #[test]
    fn test_active_stages_sorted_and_filtered() {
        let def = definition(
            r#"{"match_id": "m1", "match_stages": [
                {"stage_uuid": "b", "stage_number": 2},
                {"stage_uuid": "a", "stage_number": 3},
                {"stage_uuid": "c", "stage_number": 1, "stage_deleted": true},
                {"stage_uuid": "d", "stage_number": 2}
            ]}"#,
        );
        let mut m = Match::new(&def);
        m.merge(&def, None, &DisplaySettings::default());

        let ids: Vec<&str> = m.active_stages().iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "d", "a"]);
        assert!(m.stages.contains_key("c"));
    }

    #[test]
    fn test_newer_definition_refreshes_discipline() {
        let untagged = definition(
            r#"{"match_id": "m1", "match_modifieddate": "2024-05-01 09:00:00",
                "match_stages": [{"stage_uuid": "st1"}]}"#,
        );
        let sc = scores(
            r#"{"match_scores": [{"stage_uuid": "st1", "stage_stagescores": [{"shtr": "s1", "str": [5, 5]}]}]}"#,
        );
        let display = DisplaySettings::default();
        let mut m = Match::new(&untagged);
        m.merge(&untagged, Some(&sc), &display);
        assert_eq!(m.discipline, Discipline::Unknown);

        let mut tagged = untagged.clone();
        tagged.match_subtype = "scsa".to_string();
        let same_stamp = m.merge(&tagged, Some(&sc), &display);
        assert_eq!(m.discipline, Discipline::Unknown);
        assert_eq!(same_stamp.updated, 0);

        tagged.match_modifieddate = ModifiedAt::parse("2024-05-01 09:05:00");
        m.merge(&tagged, Some(&sc), &display);

        assert_eq!(m.discipline, Discipline::Scsa);
        assert_eq!(m.subtype, "scsa");
        assert!(m.is_ranked());
        assert!(matches!(m.stages["st1"].rules, StageRules::Strings { .. }));
        assert!(matches!(
            m.score("st1", "s1").map(|s| &s.raw),
            Some(RawScore::Strings { .. })
        ));
    }
}
