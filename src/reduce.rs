//! Dimensionality reduction of the confound submatrix.
//!
//! The design builder only depends on [`ConfoundReducer`]; [`PcaReducer`] is
//! the default implementation (centred PCA keeping the smallest number of
//! components whose cumulative explained variance exceeds the retained
//! fraction, as `sklearn.decomposition.PCA(0.99)` does).
use nalgebra::DMatrix;
use ndarray::Array2;

use crate::error::{DesignError, Result};

/// Reduces a `[T, N]` confound matrix to `[T, M]`.
pub trait ConfoundReducer {
    fn reduce(&self, data: &Array2<f64>, retained_variance: f64) -> Result<Array2<f64>>;
}

/// Principal component scores via a thin SVD of the centred data.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcaReducer;

impl ConfoundReducer for PcaReducer {
    fn reduce(&self, data: &Array2<f64>, retained_variance: f64) -> Result<Array2<f64>> {
        let (n, p) = data.dim();
        if n == 0 || p == 0 {
            return Ok(data.clone());
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(DesignError::Linalg("non-finite confound values".into()));
        }

        let mut centred = data.clone();
        crate::normalize::demean_columns_inplace(&mut centred);

        let x = DMatrix::from_fn(n, p, |i, j| centred[[i, j]]);
        let svd = x.svd(true, false);
        let u = svd
            .u
            .as_ref()
            .ok_or_else(|| DesignError::Linalg("SVD did not return U".into()))?;

        // nalgebra does not guarantee ordering.
        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

        let var: Vec<f64> = order.iter().map(|&k| svd.singular_values[k].powi(2)).collect();
        let total: f64 = var.iter().sum();
        if total <= 0.0 {
            return Ok(Array2::zeros((n, 0)));
        }
        let n_keep = n_components(&var, total, retained_variance);

        // Scores = U · S.
        Ok(Array2::from_shape_fn((n, n_keep), |(i, c)| {
            let k = order[c];
            u[(i, k)] * svd.singular_values[k]
        }))
    }
}

/// Smallest `k` with cumulative explained variance ratio strictly above
/// `retained` (capped at the number of components).
fn n_components(var: &[f64], total: f64, retained: f64) -> usize {
    let mut cum = 0.0;
    let mut k = 0;
    for v in var {
        if cum / total > retained {
            break;
        }
        cum += v;
        k += 1;
    }
    k.min(var.len())
}
