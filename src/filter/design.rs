//! Highpass filter matrix matching FSL's Gaussian running-line filter.
//!
//! For a cutoff of `c` seconds at repetition time `TR`:
//!   • σ² = (c / TR / √2)²                      (in samples)
//!   • K[i, j] ∝ exp(−(i − j)² / 2σ²)           Toeplitz, rows normalised to 1
//!   • H[k, :] = row k of X (W X)⁺ W,  W = diag(K[k, :]),  X = [1, t]
//!   • F = I − H
//!
//! Each hat row needs only the thin `ntp × 2` pseudo-inverse of `W X`, so the
//! whole filter costs O(ntp²) rather than a dense pseudo-inverse of an
//! `ntp × ntp` product per row.
use nalgebra::DMatrix;
use ndarray::Array2;
use std::f64::consts::PI;

use crate::error::{DesignError, Result};

/// Relative singular-value cutoff of the pseudo-inverse (`numpy.linalg.pinv`).
const PINV_RCOND: f64 = 1e-15;

/// Row-normalised Gaussian weight matrix `K` (`ntp × ntp`).
pub fn gaussian_weights(ntp: usize, cutoff: f64, tr: f64) -> Result<Array2<f64>> {
    if !(cutoff.is_finite() && cutoff > 0.0) {
        return Err(DesignError::Configuration(format!(
            "highpass cutoff must be positive, got {cutoff}"
        )));
    }
    if !(tr.is_finite() && tr > 0.0) {
        return Err(DesignError::Configuration(format!("tr must be positive, got {tr}")));
    }

    let cutoff_samples = cutoff / tr;
    let sig2n = (cutoff_samples / 2.0_f64.sqrt()).powi(2);
    let norm = 1.0 / (2.0 * PI * sig2n).sqrt();
    let kernel: Vec<f64> = (0..ntp)
        .map(|lag| norm * (-((lag * lag) as f64) / (2.0 * sig2n)).exp())
        .collect();

    let mut k = Array2::from_shape_fn((ntp, ntp), |(i, j)| kernel[i.abs_diff(j)]);
    for mut row in k.rows_mut() {
        let s = row.sum();
        if s > 0.0 {
            row /= s;
        }
    }
    Ok(k)
}

/// Filter matrix `F` (`ntp × ntp`); premultiply data by it to highpass filter.
///
/// # Examples
///
/// ```
/// use fmri_design::filter::highpass_matrix;
///
/// let f = highpass_matrix(100, 128.0, 2.0).unwrap();
/// assert_eq!(f.dim(), (100, 100));
/// ```
pub fn highpass_matrix(ntp: usize, cutoff: f64, tr: f64) -> Result<Array2<f64>> {
    let k = gaussian_weights(ntp, cutoff, tr)?;
    let mut f = Array2::<f64>::eye(ntp);

    for (row_idx, weights) in k.rows().into_iter().enumerate() {
        let w: Vec<f64> = weights.to_vec();
        let wx = DMatrix::from_fn(ntp, 2, |j, c| if c == 0 { w[j] } else { w[j] * j as f64 });
        let pinv = pinv_thin(wx)?;

        // Row k of X (W X)⁺ W, with x_k = [1, k].
        let t = row_idx as f64;
        for (j, &wj) in w.iter().enumerate() {
            f[[row_idx, j]] -= (pinv[(0, j)] + t * pinv[(1, j)]) * wj;
        }
    }
    Ok(f)
}

/// Moore–Penrose pseudo-inverse of a tall `n × 2` matrix.
fn pinv_thin(a: DMatrix<f64>) -> Result<DMatrix<f64>> {
    if a.iter().any(|v| !v.is_finite()) {
        return Err(DesignError::Linalg("non-finite local regression weights".into()));
    }
    let svd = a.svd(true, true);
    let smax = svd.singular_values.iter().fold(0.0_f64, |m, &s| m.max(s));
    svd.pseudo_inverse(smax * PINV_RCOND)
        .map_err(|e| DesignError::Linalg(format!("pseudo-inverse failed: {e}")))
}
