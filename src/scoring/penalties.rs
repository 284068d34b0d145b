use ndarray::{Array1, Array2};

/// Number of penalty categories per string in SCSA and SASS scores.
pub const CATEGORIES: usize = 4;

/// Builds a `rows x CATEGORIES` count matrix. Missing rows or columns are
/// zero; extra ones are ignored.
pub fn penalty_matrix(penalties: &[Vec<u32>], rows: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, CATEGORIES), |(i, j)| {
        penalties
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0) as f64
    })
}

/// Pads or truncates string times to `count` entries.
pub fn string_times(strings: &[f64], count: usize) -> Array1<f64> {
    Array1::from_shape_fn(count, |i| strings.get(i).copied().unwrap_or(0.0))
}

/// Weighted penalty seconds per row.
pub fn weighted(matrix: &Array2<f64>, weights: &[f64; CATEGORIES]) -> Array1<f64> {
    matrix.dot(&Array1::from(weights.to_vec()))
}
