//! Statistics toolkit
//!
//! Pure math primitives shared by every analyzer: ordinary least squares,
//! moving average and population standard deviation. Degenerate input is a
//! defined no-growth case, never an error.

use serde::{Deserialize, Serialize};

/// Ordinary least squares fit over an `(x, y)` series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Regression {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a least-squares line through `points`.
///
/// Fewer than 2 points, or all-identical x values (zero denominator), yield
/// an all-zero fit. Constant y yields `r_squared = 0`.
pub fn linear_regression(points: &[(f64, f64)]) -> Regression {
    let n = points.len() as f64;
    if points.len() < 2 {
        return Regression::default();
    }

    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < 1e-10 {
        return Regression::default();
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();

    let r_squared = if ss_tot > 1e-10 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    Regression {
        slope,
        intercept,
        r_squared,
    }
}

/// Sliding mean over `window` consecutive points.
///
/// Input shorter than the window is returned unchanged (no smoothing
/// applied).
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return values.to_vec();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Population standard deviation; 0 for fewer than 2 values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_perfectly_linear_series() {
        let points: Vec<(f64, f64)> = (0..10).map(|x| (x as f64, 2.0 * x as f64 + 3.0)).collect();
        let fit = linear_regression(&points);
        assert!((fit.slope - 2.0).abs() < EPS);
        assert!((fit.intercept - 3.0).abs() < EPS);
        assert!((fit.r_squared - 1.0).abs() < EPS);
    }

    #[test]
    fn test_regression_degenerate_input() {
        assert_eq!(linear_regression(&[]), Regression::default());
        assert_eq!(linear_regression(&[(1.0, 5.0)]), Regression::default());
        // All x identical: zero denominator
        let fit = linear_regression(&[(2.0, 1.0), (2.0, 5.0), (2.0, 9.0)]);
        assert_eq!(fit, Regression::default());
    }

    #[test]
    fn test_regression_constant_y_has_zero_r_squared() {
        let fit = linear_regression(&[(0.0, 4.0), (1.0, 4.0), (2.0, 4.0)]);
        assert!(fit.slope.abs() < EPS);
        assert!((fit.intercept - 4.0).abs() < EPS);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_moving_average_basic() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(moving_average(&values, 3), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_moving_average_window_larger_than_input() {
        let values = vec![1.0, 2.0];
        assert_eq!(moving_average(&values, 3), values);
    }

    #[test]
    fn test_std_dev_small_inputs() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[42.0]), 0.0);
    }

    #[test]
    fn test_std_dev_population() {
        // Population std dev of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&values) - 2.0).abs() < EPS);
    }

    proptest! {
        #[test]
        fn prop_regression_recovers_exact_lines(
            slope in -100.0f64..100.0,
            intercept in -1000.0f64..1000.0,
            n in 2usize..50,
        ) {
            let points: Vec<(f64, f64)> = (0..n)
                .map(|x| (x as f64, slope * x as f64 + intercept))
                .collect();
            let fit = linear_regression(&points);
            prop_assert!((fit.slope - slope).abs() < 1e-6);
            prop_assert!((fit.intercept - intercept).abs() < 1e-4);
        }

        #[test]
        fn prop_moving_average_never_longer_than_input(
            values in proptest::collection::vec(-1e6f64..1e6, 0..40),
            window in 1usize..10,
        ) {
            let smoothed = moving_average(&values, window);
            prop_assert!(smoothed.len() <= values.len());
        }
    }
}
