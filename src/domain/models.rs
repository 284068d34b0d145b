use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::lenient::{self, Lenient};
use super::timestamp::{self, ModifiedAt};

// Every field a terminal fills in is read through `lenient`: absent, `null`
// or mistyped values take the field's default.

// --- Status Documents ---

/// Status document returned by a terminal (message type 7).
///
/// Every field is optional; unknown fields are kept for diagnostics.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatusDocument {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_matchname: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_matchid: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_modified: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_battery: Option<i64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_uniqueid: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_host: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ps_port: Option<u16>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Status request payload sent to a terminal (message type 6).
#[derive(Debug, Clone, Serialize)]
pub struct StatusRequest {
    pub ps_name: String,
    pub ps_port: u16,
    pub ps_host: String,
    pub ps_matchname: String,
    pub ps_matchid: String,
    pub ps_modified: String,
    pub ps_battery: i64,
    pub ps_uniqueid: String,
}

// --- Match Definition Document ---

/// Raw match definition as reported by one terminal
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MatchDefinition {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub match_id: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub match_name: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub match_modifieddate: Option<ModifiedAt>,
    /// Discipline tag (`ipsc`, `scsa`, ...)
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub match_subtype: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub match_cats: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub match_pfs: Vec<PowerFactor>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub match_penalties: Vec<PenaltyDefinition>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub match_shooters: Vec<ShooterRecord>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub match_stages: Vec<StageRecord>,
}

/// Zone values for one IPSC power factor. Scoring zones are added, penalty
/// zones (`M`, `NS`) are subtracted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PowerFactor {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub name: String,
    #[serde(rename = "A", default, deserialize_with = "lenient::deserialize")]
    pub a: f64,
    #[serde(rename = "B", default, deserialize_with = "lenient::deserialize")]
    pub b: f64,
    #[serde(rename = "C", default, deserialize_with = "lenient::deserialize")]
    pub c: f64,
    #[serde(rename = "D", default, deserialize_with = "lenient::deserialize")]
    pub d: f64,
    #[serde(rename = "M", default, deserialize_with = "lenient::deserialize")]
    pub miss: f64,
    #[serde(rename = "NS", default, deserialize_with = "lenient::deserialize")]
    pub no_shoot: f64,
    #[serde(rename = "NPM", default, deserialize_with = "lenient::deserialize")]
    pub no_penalty_miss: f64,
}

/// Named penalty and its value, as configured for the match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PenaltyDefinition {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub pen_name: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub pen_val: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShooterRecord {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_uid: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_fn: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_ln: String,
    /// Division
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_dvp: String,
    /// Power factor name (IPSC)
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_pf: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_del: bool,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub sh_dq: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub sh_mod: Option<ModifiedAt>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StageRecord {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_uuid: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_number: u32,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_name: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_deleted: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub stage_modifieddate: Option<ModifiedAt>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_poppers: u32,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub stage_targets: Vec<TargetRecord>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_strings: Option<u32>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_removeworststring: Option<StringDrop>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub stage_customtargets: Vec<CustomTargetRecord>,
}

/// Terminals report the drop-worst setting either as a flag or as a count.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringDrop {
    Flag(bool),
    Count(u32),
}

impl Default for StringDrop {
    fn default() -> Self {
        StringDrop::Flag(false)
    }
}

impl StringDrop {
    pub fn count(&self) -> u32 {
        match self {
            StringDrop::Flag(true) => 1,
            StringDrop::Flag(false) => 0,
            StringDrop::Count(n) => *n,
        }
    }
}

impl Lenient for StringDrop {
    fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(flag) => Some(StringDrop::Flag(flag)),
            other => u32::from_value(other).map(StringDrop::Count),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TargetRecord {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub target_reqshots: u32,
}

/// NRA / Silhouette target definition: each sub-target carries a weight.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomTargetRecord {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ctgt_id: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ctgt_name: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub ctgt_subs: Vec<SubTargetRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubTargetRecord {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub value: f64,
}

// --- Match Scores Document ---

/// Raw match scores as reported by one terminal. Absent when the terminal
/// has a match loaded but has not recorded any score yet.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MatchScores {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub match_scores: Vec<StageScores>,
}

impl MatchScores {
    pub fn is_empty(&self) -> bool {
        self.match_scores.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StageScores {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub stage_uuid: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub stage_stagescores: Vec<StageScoreRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StageScoreRecord {
    /// Shooter id
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub shtr: String,
    #[serde(rename = "mod", default, deserialize_with = "timestamp::deserialize_optional")]
    pub modified: Option<ModifiedAt>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub dnf: bool,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub aprv: bool,
    /// String times
    #[serde(rename = "str", default, deserialize_with = "lenient::deserialize")]
    pub strings: Vec<f64>,
    /// Penalty counts, one row per string
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub penss: Vec<Vec<u32>>,
    /// Packed per-target hit counts (IPSC)
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub ts: Vec<u32>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub poph: u32,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub popm: u32,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub popns: u32,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub proc_cnts: Vec<BTreeMap<String, u32>>,
    /// Custom target hits (NRA / Silhouette)
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub ctgts: Vec<TargetHitsRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TargetHitsRecord {
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub tgt: String,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub hits: BTreeMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let json = r#"{
            "match_id": "m1",
            "match_shooters": [{"sh_uid": "s1"}],
            "match_stages": [{"stage_uuid": "st1"}]
        }"#;
        let def: MatchDefinition = serde_json::from_str(json).unwrap();

        let shooter = &def.match_shooters[0];
        assert!(!shooter.sh_del);
        assert!(!shooter.sh_dq);
        assert!(shooter.sh_mod.is_none());
        assert_eq!(def.match_stages[0].stage_poppers, 0);
        assert!(def.match_stages[0].stage_removeworststring.is_none());
        assert!(def.match_modifieddate.is_none());
    }

    #[test]
    fn test_score_record_field_names() {
        let json = r#"{
            "shtr": "s1",
            "mod": "2024-05-01 10:00:00.000",
            "str": [1.5, 2.5],
            "ts": [33],
            "proc_cnts": [{"1": 2}]
        }"#;
        let score: StageScoreRecord = serde_json::from_str(json).unwrap();

        assert!(!score.dnf);
        assert_eq!(score.strings, vec![1.5, 2.5]);
        assert_eq!(score.ts, vec![33]);
        assert!(score.modified.is_some());
    }

    #[test]
    fn test_string_drop_accepts_flag_or_count() {
        let flag: StringDrop = serde_json::from_str("true").unwrap();
        let count: StringDrop = serde_json::from_str("2").unwrap();

        assert_eq!(flag.count(), 1);
        assert_eq!(count.count(), 2);
    }

    #[test]
    fn test_status_keeps_unknown_fields() {
        let json = r#"{"ps_name": "Tablet 1", "ps_matchid": "m1", "ps_extra": 5}"#;
        let status: StatusDocument = serde_json::from_str(json).unwrap();

        assert_eq!(status.ps_name.as_deref(), Some("Tablet 1"));
        assert_eq!(status.extra.get("ps_extra"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn test_null_fields_do_not_fail_the_definition() {
        let json = r#"{
            "match_id": "m1",
            "match_name": null,
            "match_pfs": null,
            "match_shooters": [{"sh_uid": "s1", "sh_pf": null, "sh_dq": 0, "sh_mod": null}],
            "match_stages": [{"stage_uuid": "st1", "stage_number": 2.0, "stage_strings": null,
                              "stage_removeworststring": 1.0}]
        }"#;
        let def: MatchDefinition = serde_json::from_str(json).unwrap();

        let shooter = &def.match_shooters[0];
        assert_eq!(def.match_name, "");
        assert!(def.match_pfs.is_empty());
        assert_eq!(shooter.sh_pf, "");
        assert!(!shooter.sh_dq);
        assert_eq!(def.match_stages[0].stage_number, 2);
        assert!(def.match_stages[0].stage_strings.is_none());
        assert_eq!(def.match_stages[0].stage_removeworststring, Some(StringDrop::Count(1)));
    }

    #[test]
    fn test_float_battery_does_not_fail_the_status() {
        let json = r#"{"ps_name": "Tablet", "ps_battery": 87.5, "ps_port": null}"#;
        let status: StatusDocument = serde_json::from_str(json).unwrap();

        assert_eq!(status.ps_battery, Some(87));
        assert_eq!(status.ps_port, None);
        assert_eq!(status.ps_name.as_deref(), Some("Tablet"));
    }

    #[test]
    fn test_score_record_tolerates_mixed_numbers() {
        let json = r#"{"shtr": "s1", "dnf": null, "str": [10, 9.5], "ts": [33.0], "penss": [[1, null]]}"#;
        let score: StageScoreRecord = serde_json::from_str(json).unwrap();

        assert!(!score.dnf);
        assert_eq!(score.strings, vec![10.0, 9.5]);
        assert_eq!(score.ts, vec![33]);
        assert_eq!(score.penss, vec![vec![1, 0]]);
    }
}
