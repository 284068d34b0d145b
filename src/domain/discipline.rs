use serde::Serialize;

/// Scoring ruleset family of a match, read from the definition's
/// `match_subtype` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Ipsc,
    Scsa,
    Nra,
    Sass,
    Silhouette,
    Unknown,
}

/// Which end of the sorted totals wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    HigherWins,
    LowerWins,
}

impl Discipline {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ipsc" => Discipline::Ipsc,
            "scsa" => Discipline::Scsa,
            "nra" => Discipline::Nra,
            "sass" => Discipline::Sass,
            "silhouette" => Discipline::Silhouette,
            _ => Discipline::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Discipline::Ipsc => "ipsc",
            Discipline::Scsa => "scsa",
            Discipline::Nra => "nra",
            Discipline::Sass => "sass",
            Discipline::Silhouette => "silhouette",
            Discipline::Unknown => "unknown",
        }
    }

    /// Unknown disciplines are kept as placeholders but never ranked.
    pub fn is_ranked(&self) -> bool {
        !matches!(self, Discipline::Unknown)
    }

    pub fn rank_order(&self) -> RankOrder {
        match self {
            Discipline::Scsa | Discipline::Sass => RankOrder::LowerWins,
            _ => RankOrder::HigherWins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_is_case_insensitive() {
        assert_eq!(Discipline::from_tag("IPSC"), Discipline::Ipsc);
        assert_eq!(Discipline::from_tag(" scsa "), Discipline::Scsa);
        assert_eq!(Discipline::from_tag("Silhouette"), Discipline::Silhouette);
    }

    #[test]
    fn test_unrecognised_tag_is_unknown_and_unranked() {
        let discipline = Discipline::from_tag("idpa");

        assert_eq!(discipline, Discipline::Unknown);
        assert!(!discipline.is_ranked());
    }

    #[test]
    fn test_rank_order() {
        assert_eq!(Discipline::Ipsc.rank_order(), RankOrder::HigherWins);
        assert_eq!(Discipline::Nra.rank_order(), RankOrder::HigherWins);
        assert_eq!(Discipline::Scsa.rank_order(), RankOrder::LowerWins);
        assert_eq!(Discipline::Sass.rank_order(), RankOrder::LowerWins);
    }
}
