/// Hungarian (Kuhn-Munkres) assignment for detection-to-track matching
///
/// The solver always returns a globally optimal one-to-one assignment; there
/// is no greedy shortcut for sparse matrices.
use ndarray::ArrayView2;
use pathfinding::prelude::{kuhn_munkres, Matrix};

/// Fixed-point scale used to turn f32 weights into the integer weights the
/// solver needs. Weights in [0, 1] keep their full f32 precision down to 2^-8.
const WEIGHT_SCALE: f64 = 4_294_967_296.0; // 2^32

/// Result of Hungarian assignment algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentResult {
    /// Assignments as (row_idx, col_idx) pairs, i.e. (detection_idx, track_idx)
    pub assignments: Vec<(usize, usize)>,
    /// Indices of unassigned rows (detections), ascending
    pub unassigned_rows: Vec<usize>,
    /// Indices of unassigned columns (tracks), ascending
    pub unassigned_cols: Vec<usize>,
    /// Sum of the weights of all assignments
    pub total_weight: f32,
}

/// Hungarian assignment solver
pub struct HungarianSolver;

impl HungarianSolver {
    /// Find the one-to-one assignment of rows to columns with maximum total weight
    ///
    /// # Arguments
    /// * `weights` - weights\[i\]\[j\] is the gain of assigning row i to column j.
    ///   Negative or non-finite entries are treated as 0.
    ///
    /// # Returns
    /// Only pairs with a strictly positive weight are reported as assignments;
    /// everything else ends up unassigned.
    pub fn maximize(weights: ArrayView2<f32>) -> AssignmentResult {
        let (num_rows, num_cols) = weights.dim();

        if num_rows == 0 || num_cols == 0 {
            return AssignmentResult {
                assignments: Vec::new(),
                unassigned_rows: (0..num_rows).collect(),
                unassigned_cols: (0..num_cols).collect(),
                total_weight: 0.0,
            };
        }

        let weight_at = |i: usize, j: usize| {
            let w = weights[[i, j]];
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        };

        // The solver wants at least as many columns as rows, pad to square
        let size = num_rows.max(num_cols);
        let mut int_weights = Matrix::new(size, size, 0i64);
        for i in 0..num_rows {
            for j in 0..num_cols {
                int_weights[(i, j)] = (f64::from(weight_at(i, j)) * WEIGHT_SCALE).round() as i64;
            }
        }

        let (_, row_to_col) = kuhn_munkres(&int_weights);

        let mut assignments = Vec::new();
        let mut row_assigned = vec![false; num_rows];
        let mut col_assigned = vec![false; num_cols];
        let mut total_weight = 0.0;

        for (i, &j) in row_to_col.iter().enumerate().take(num_rows) {
            if j < num_cols && weight_at(i, j) > 0.0 {
                assignments.push((i, j));
                row_assigned[i] = true;
                col_assigned[j] = true;
                total_weight += weight_at(i, j);
            }
        }

        AssignmentResult {
            assignments,
            unassigned_rows: (0..num_rows).filter(|&i| !row_assigned[i]).collect(),
            unassigned_cols: (0..num_cols).filter(|&j| !col_assigned[j]).collect(),
            total_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use quickcheck::{quickcheck, TestResult};

    /// Best total weight over every partial one-to-one matching
    fn brute_force_best(weights: &Array2<f32>) -> f32 {
        fn go(weights: &Array2<f32>, row: usize, used: &mut Vec<bool>) -> f32 {
            if row == weights.nrows() {
                return 0.0;
            }
            // leave this row unassigned
            let mut best = go(weights, row + 1, used);
            for j in 0..weights.ncols() {
                if !used[j] {
                    used[j] = true;
                    best = best.max(weights[[row, j]] + go(weights, row + 1, used));
                    used[j] = false;
                }
            }
            best
        }
        go(weights, 0, &mut vec![false; weights.ncols()])
    }

    #[test]
    fn test_square_assignment() {
        let weights = array![[0.1, 0.9, 0.0], [0.8, 0.2, 0.0], [0.0, 0.0, 0.7]];
        let res = HungarianSolver::maximize(weights.view());
        assert_eq!(res.assignments, vec![(0, 1), (1, 0), (2, 2)]);
        assert!(res.unassigned_rows.is_empty());
        assert!(res.unassigned_cols.is_empty());
        assert_abs_diff_eq!(res.total_weight, 2.4, epsilon = 1e-5);
    }

    #[test]
    fn test_global_not_greedy() {
        // Greedy would take (0, 0) = 0.9 and then (1, 1) = 0.1
        let weights = array![[0.9, 0.8], [0.85, 0.1]];
        let res = HungarianSolver::maximize(weights.view());
        assert_eq!(res.assignments, vec![(0, 1), (1, 0)]);
        assert_abs_diff_eq!(res.total_weight, 1.65, epsilon = 1e-5);
    }

    #[test]
    fn test_more_rows_than_columns() {
        let weights = array![[0.2], [0.9], [0.5]];
        let res = HungarianSolver::maximize(weights.view());
        assert_eq!(res.assignments, vec![(1, 0)]);
        assert_eq!(res.unassigned_rows, vec![0, 2]);
        assert!(res.unassigned_cols.is_empty());
    }

    #[test]
    fn test_more_columns_than_rows() {
        let weights = array![[0.3, 0.0, 0.6, 0.1]];
        let res = HungarianSolver::maximize(weights.view());
        assert_eq!(res.assignments, vec![(0, 2)]);
        assert_eq!(res.unassigned_cols, vec![0, 1, 3]);
    }

    #[test]
    fn test_zero_weights_are_not_assigned() {
        let weights = array![[0.0, 0.0], [0.0, 0.5]];
        let res = HungarianSolver::maximize(weights.view());
        assert_eq!(res.assignments, vec![(1, 1)]);
        assert_eq!(res.unassigned_rows, vec![0]);
        assert_eq!(res.unassigned_cols, vec![0]);
    }

    #[test]
    fn test_invalid_weights_are_ignored() {
        let weights = array![[f32::NAN, -1.0], [f32::INFINITY, 0.4]];
        let res = HungarianSolver::maximize(weights.view());
        assert_eq!(res.assignments, vec![(1, 1)]);
    }

    #[test]
    fn test_empty() {
        let res = HungarianSolver::maximize(Array2::<f32>::zeros((0, 3)).view());
        assert!(res.assignments.is_empty());
        assert!(res.unassigned_rows.is_empty());
        assert_eq!(res.unassigned_cols, vec![0, 1, 2]);

        let res = HungarianSolver::maximize(Array2::<f32>::zeros((2, 0)).view());
        assert_eq!(res.unassigned_rows, vec![0, 1]);
        assert!(res.unassigned_cols.is_empty());
    }

    quickcheck! {
        fn prop_assignment_is_optimal(rows: u8, cols: u8, seed: Vec<u16>) -> TestResult {
            let rows = (rows % 5) as usize + 1;
            let cols = (cols % 5) as usize + 1;
            if seed.len() < rows * cols {
                return TestResult::discard();
            }
            let weights = Array2::from_shape_fn((rows, cols), |(i, j)| {
                let raw = seed[i * cols + j] % 1001;
                // roughly a third of the entries are ineligible
                if raw < 333 { 0.0 } else { f32::from(raw) / 1000.0 }
            });

            let res = HungarianSolver::maximize(weights.view());

            let mut seen_rows = vec![false; rows];
            let mut seen_cols = vec![false; cols];
            for &(i, j) in &res.assignments {
                if seen_rows[i] || seen_cols[j] || weights[[i, j]] == 0.0 {
                    return TestResult::failed();
                }
                seen_rows[i] = true;
                seen_cols[j] = true;
            }

            TestResult::from_bool((res.total_weight - brute_force_best(&weights)).abs() < 1e-4)
        }
    }
}
