//! Hires → acquisition resampling.
//!
//! Each acquisition integrates signal over the interval that follows its
//! timestamp, so the representative hires sample is the one nearest the
//! interval midpoint `t_k + TR/2`:
//!
//! ```text
//! hires      ·  ·  ·  ·  ·  ·  ·  ·  ·  ·  ·  ·  ·  ·  ·  ·
//! acq        |-----------|-----------|-----------|
//!            t₀    ↑     t₁    ↑     t₂    ↑
//!                  t₀+TR/2     t₁+TR/2     t₂+TR/2
//! ```
//!
//! Nearest-neighbour selection matches `scipy.interpolate.interp1d(kind=
//! "nearest")`: a query exactly halfway between two hires samples takes the
//! lower one, and queries outside `[hires₀, hires_last]` are an error.
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{DesignError, Result};
use crate::grid::searchsorted;

/// Index of the hires sample nearest each query time.
pub fn nearest_indices(hires: &[f64], queries: &[f64]) -> Result<Vec<usize>> {
    let n = hires.len();
    if n == 0 {
        return Err(DesignError::Configuration("empty hires grid".into()));
    }
    let (start, end) = (hires[0], hires[n - 1]);

    // Decision boundaries halfway between neighbouring samples.
    let bounds: Vec<f64> = hires.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();

    queries
        .iter()
        .map(|&q| {
            if !(q >= start && q <= end) {
                return Err(DesignError::Resample { time: q, start, end });
            }
            Ok(searchsorted(&bounds, q))
        })
        .collect()
}

/// Sample one hires timecourse at the acquisition midpoints.
pub fn resample_1d(
    x: ArrayView1<'_, f64>,
    hires: &[f64],
    frametimes: &[f64],
    tr: f64,
) -> Result<Array1<f64>> {
    if x.len() != hires.len() {
        return Err(DesignError::Configuration(format!(
            "timecourse of length {} on a hires grid of length {}",
            x.len(),
            hires.len()
        )));
    }
    let midpoints: Vec<f64> = frametimes.iter().map(|&t| t + tr / 2.0).collect();
    let idx = nearest_indices(hires, &midpoints)?;
    Ok(idx.into_iter().map(|i| x[i]).collect())
}

/// Resample every column of a `[T_hires, N]` matrix to `[ntp, N]`.
pub fn resample(
    data: &Array2<f64>,
    hires: &[f64],
    frametimes: &[f64],
    tr: f64,
) -> Result<Array2<f64>> {
    if data.nrows() != hires.len() {
        return Err(DesignError::Configuration(format!(
            "{} hires rows for a grid of length {}",
            data.nrows(),
            hires.len()
        )));
    }
    let midpoints: Vec<f64> = frametimes.iter().map(|&t| t + tr / 2.0).collect();
    let idx = nearest_indices(hires, &midpoints)?;
    Ok(data.select(Axis(0), &idx))
}
