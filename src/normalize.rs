//! Column demeaning and peak-to-peak heights.
//!
//! `demean_columns_inplace` — `X -= X.mean(axis=0)`; returns the removed means.
//!
//! `peak_to_peak` — `X.max(axis=0) − X.min(axis=0)`, the `/PPheights` row of a
//! FEAT design file.
use ndarray::{Array1, Array2, Axis};

/// Subtract each column's mean in place.  Returns the means that were removed.
pub fn demean_columns_inplace(data: &mut Array2<f64>) -> Array1<f64> {
    if data.nrows() == 0 {
        return Array1::zeros(data.ncols());
    }
    let means = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(data.ncols()));
    for mut row in data.rows_mut() {
        row -= &means;
    }
    means
}

/// Per-column `max − min`.
pub fn peak_to_peak(data: &Array2<f64>) -> Vec<f64> {
    data.columns()
        .into_iter()
        .map(|col| {
            let (lo, hi) = col
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            if lo.is_finite() && hi.is_finite() { hi - lo } else { 0.0 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn columns_have_zero_mean() {
        let mut data = Array2::from_shape_fn((64, 4), |(t, c)| (t as f64 * 0.3 + c as f64).sin() * 5.0 + c as f64);
        demean_columns_inplace(&mut data);
        for col in data.columns() {
            approx::assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn returned_means_are_original() {
        let mut data = array![[1.0, 10.0], [3.0, 20.0]];
        let means = demean_columns_inplace(&mut data);
        assert_eq!(means.to_vec(), vec![2.0, 15.0]);
        assert_eq!(data, array![[-1.0, -5.0], [1.0, 5.0]]);
    }

    #[test]
    fn peak_to_peak_per_column() {
        let data = array![[1.0, -2.0], [4.0, 0.5], [2.0, 0.0]];
        assert_eq!(peak_to_peak(&data), vec![3.0, 2.5]);
    }

    #[test]
    fn peak_to_peak_unaffected_by_demeaning() {
        let mut data = array![[1.0], [7.0], [4.0]];
        let before = peak_to_peak(&data);
        demean_columns_inplace(&mut data);
        approx::assert_abs_diff_eq!(peak_to_peak(&data)[0], before[0], epsilon = 1e-12);
    }
}
