//! Acquisition and hires timestamp grids.
//!
//! ```text
//! acquisition  t_k = k · TR                      k = 0 .. ntp
//! hires        s_j = j · TR / oversampling       s_j < ntp · TR  (+1 s if oversampling == 1)
//! ```
use ndarray::Array1;

use crate::error::{DesignError, Result};

/// The two related time grids of a design.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGrid {
    tr: f64,
    oversampling: usize,
    frametimes: Array1<f64>,
    hires: Array1<f64>,
}

impl FrameGrid {
    /// Build the grids for `ntp` acquisitions at repetition time `tr`.
    pub fn new(ntp: usize, tr: f64, oversampling: usize) -> Result<Self> {
        if ntp == 0 {
            return Err(DesignError::Configuration("ntp must be at least 1".into()));
        }
        if !(tr.is_finite() && tr > 0.0) {
            return Err(DesignError::Configuration(format!("tr must be positive, got {tr}")));
        }
        if oversampling == 0 {
            return Err(DesignError::Configuration("oversampling must be at least 1".into()));
        }

        let frametimes = arange(0.0, ntp as f64 * tr, tr);

        // Without oversampling the last midpoint would sit past the final sample.
        let mut stop = ntp as f64 * tr;
        if oversampling == 1 {
            stop += 1.0;
        }
        let hires = arange(0.0, stop, tr / oversampling as f64);

        Ok(Self { tr, oversampling, frametimes, hires })
    }

    pub fn tr(&self) -> f64 {
        self.tr
    }

    pub fn oversampling(&self) -> usize {
        self.oversampling
    }

    /// Hires sample spacing `tr / oversampling`.
    pub fn dt(&self) -> f64 {
        self.tr / self.oversampling as f64
    }

    /// Number of acquisitions.
    pub fn ntp(&self) -> usize {
        self.frametimes.len()
    }

    /// Acquisition timestamps.
    pub fn frametimes(&self) -> &Array1<f64> {
        &self.frametimes
    }

    /// Hires timestamps.
    pub fn hires(&self) -> &Array1<f64> {
        &self.hires
    }
}

/// `numpy.arange(start, stop, step)` for a positive step.
///
/// The length is `ceil((stop - start) / step)`, with ratios within 1e-9 of an
/// integer treated as exact so `20 / 0.125` yields 160 samples, not 161.
pub fn arange(start: f64, stop: f64, step: f64) -> Array1<f64> {
    let ratio = (stop - start) / step;
    if ratio <= 0.0 {
        return Array1::zeros(0);
    }
    let rounded = ratio.round();
    let n = if (ratio - rounded).abs() < 1e-9 { rounded } else { ratio.ceil() } as usize;
    Array1::from_shape_fn(n, |i| start + i as f64 * step)
}

/// `numpy.linspace(start, stop, n)` with the endpoint included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            Array1::from_shape_fn(n, |i| start + i as f64 * step)
        }
    }
}

/// `numpy.searchsorted(sorted, x, side='left')`.
pub(crate) fn searchsorted(sorted: &[f64], x: f64) -> usize {
    sorted.partition_point(|&t| t < x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searchsorted_takes_left_insertion_point() {
        let grid = [0.0, 0.5, 1.0, 1.5];
        assert_eq!(searchsorted(&grid, -1.0), 0);
        assert_eq!(searchsorted(&grid, 0.5), 1);
        assert_eq!(searchsorted(&grid, 0.7), 2);
        assert_eq!(searchsorted(&grid, 9.0), 4);
    }

    #[test]
    fn grid_lengths() {
        let g = FrameGrid::new(10, 2.0, 16).unwrap();
        assert_eq!(g.ntp(), 10);
        assert_eq!(g.hires().len(), 160);
        assert_eq!(g.frametimes()[9], 18.0);
        approx::assert_abs_diff_eq!(g.hires()[159], 19.875, epsilon = 1e-12);
    }

    #[test]
    fn no_oversampling_extends_hires_grid() {
        let g = FrameGrid::new(10, 2.0, 1).unwrap();
        // arange(0, 21, 2) → 0, 2, …, 20
        assert_eq!(g.hires().len(), 11);
        assert_eq!(g.hires()[10], 20.0);
    }

    #[test]
    fn arange_fractional_step() {
        assert_eq!(arange(0.0, 1.0, 0.3).len(), 4);
        assert_eq!(arange(0.0, 20.0, 0.125).len(), 160);
        assert_eq!(arange(0.0, 0.0, 1.0).len(), 0);
    }

    #[test]
    fn linspace_includes_endpoint() {
        let x = linspace(0.0, 32.0, 256);
        assert_eq!(x[0], 0.0);
        approx::assert_abs_diff_eq!(x[255], 32.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_grid_rejected() {
        assert!(FrameGrid::new(0, 2.0, 16).is_err());
    }
}
