use std::cmp::Ordering;
use std::collections::HashMap;

use super::ShooterResult;
use crate::domain::RankOrder;

/// Sorts results best-first and assigns 1-based overall and division
/// places. Equal totals fall back to shooter id order.
pub fn rank(mut results: Vec<ShooterResult>, order: RankOrder) -> Vec<ShooterResult> {
    results.sort_by(|a, b| {
        compare_totals(a.total, b.total, order).then_with(|| a.shooter_id.cmp(&b.shooter_id))
    });

    let mut division_counts: HashMap<String, usize> = HashMap::new();
    for (index, result) in results.iter_mut().enumerate() {
        result.place = index + 1;
        let count = division_counts.entry(result.division.clone()).or_insert(0);
        *count += 1;
        result.division_place = *count;
    }

    results
}

/// Orders two totals best-first under `order`.
pub fn compare_totals(a: f64, b: f64, order: RankOrder) -> Ordering {
    match order {
        RankOrder::HigherWins => b.total_cmp(&a),
        RankOrder::LowerWins => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, division: &str, total: f64) -> ShooterResult {
        ShooterResult {
            shooter_id: id.to_string(),
            division: division.to_string(),
            total,
            ..ShooterResult::default()
        }
    }

    fn ids(results: &[ShooterResult]) -> Vec<&str> {
        results.iter().map(|r| r.shooter_id.as_str()).collect()
    }

    #[test]
    fn test_higher_wins() {
        let ranked = rank(
            vec![result("a", "Open", 10.0), result("b", "Open", 30.0), result("c", "Open", 20.0)],
            RankOrder::HigherWins,
        );

        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
        assert_eq!(ranked[0].place, 1);
    }

    #[test]
    fn test_lower_wins() {
        let ranked = rank(
            vec![result("a", "R", 100.0), result("b", "R", 80.0)],
            RankOrder::LowerWins,
        );

        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn test_ties_break_on_shooter_id() {
        let ranked = rank(
            vec![result("z", "Open", 5.0), result("m", "Open", 5.0), result("a", "Open", 5.0)],
            RankOrder::HigherWins,
        );

        assert_eq!(ids(&ranked), vec!["a", "m", "z"]);
        assert_eq!(ranked.iter().map(|r| r.place).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_division_places_count_within_division() {
        let ranked = rank(
            vec![
                result("a", "Open", 30.0),
                result("b", "Production", 20.0),
                result("c", "Open", 10.0),
            ],
            RankOrder::HigherWins,
        );

        let places: Vec<(usize, usize)> = ranked.iter().map(|r| (r.place, r.division_place)).collect();
        assert_eq!(places, vec![(1, 1), (2, 1), (3, 2)]);
    }
}
