use crate::group::GroupDataset;
use ndarray::{Array2, Axis};

/// z value of the two-sided 95% normal interval.
pub const Z_95: f64 = 1.96;

/// Across-participant summary, one row per channel/region.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub mean: Array2<f64>,
    /// Half-width of the 95% CI, present when requested
    pub ci_half_width: Option<Array2<f64>>,
}

/// Mean over participants and, with `ci`, 1.96 * sd / sqrt(n) (sd with n - 1).
pub fn summarize(group: &GroupDataset, ci: bool) -> GroupSummary {
    let n = group.participants();
    let (rows, samples, _) = group.data.dim();
    let mean = group
        .data
        .mean_axis(Axis(2))
        .unwrap_or_else(|| Array2::zeros((rows, samples)));
    let ci_half_width = ci.then(|| {
        if n < 2 {
            Array2::zeros((rows, samples))
        } else {
            group.data.std_axis(Axis(2), 1.0) * Z_95 / (n as f64).sqrt()
        }
    });
    GroupSummary {
        mean,
        ci_half_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn dataset(values: &[f64]) -> GroupDataset {
        let data = Array3::from_shape_vec((1, 1, values.len()), values.to_vec()).unwrap();
        GroupDataset {
            data,
            times: vec![0.0],
            rows: vec!["GMFA".into()],
            files: Vec::new(),
        }
    }

    fn assert_close(a: f64, b: f64, tol: f64) {
        let diff = (a - b).abs();
        assert!(
            diff <= tol,
            "diff {} exceeded tol {} ({} vs {})",
            diff,
            tol,
            a,
            b
        );
    }

    #[test]
    fn ci_matches_hand_computed_reference() {
        // mean 3, sum of squares 10, sd = sqrt(10 / 4)
        let summary = summarize(&dataset(&[1.0, 2.0, 3.0, 4.0, 5.0]), true);
        assert_close(summary.mean[[0, 0]], 3.0, 1e-12);
        let expected = 1.96 * (10.0f64 / 4.0).sqrt() / 5.0f64.sqrt();
        assert_close(summary.ci_half_width.unwrap()[[0, 0]], expected, 1e-12);
    }

    #[test]
    fn identical_participants_have_zero_width() {
        let summary = summarize(&dataset(&[4.5; 6]), true);
        assert_eq!(summary.mean[[0, 0]], 4.5);
        assert_eq!(summary.ci_half_width.unwrap()[[0, 0]], 0.0);
    }

    #[test]
    fn participant_order_does_not_matter() {
        let a = summarize(&dataset(&[0.3, -1.2, 7.0, 2.5]), true);
        let b = summarize(&dataset(&[7.0, 2.5, 0.3, -1.2]), true);
        assert_close(a.mean[[0, 0]], b.mean[[0, 0]], 1e-12);
        assert_close(
            a.ci_half_width.unwrap()[[0, 0]],
            b.ci_half_width.unwrap()[[0, 0]],
            1e-12,
        );
    }

    #[test]
    fn single_participant_has_zero_width() {
        let summary = summarize(&dataset(&[2.0]), true);
        assert_eq!(summary.ci_half_width.unwrap()[[0, 0]], 0.0);
    }

    #[test]
    fn ci_is_skipped_unless_requested() {
        assert!(summarize(&dataset(&[1.0, 2.0]), false).ci_half_width.is_none());
    }
}
