//! Apply the highpass filter matrix to time × column data.
use ndarray::{Array1, Array2, ArrayView1};

use super::design::highpass_matrix;
use crate::error::{DesignError, Result};

/// Filter every column of `data` (`[T, N]`) in place with a prebuilt `F`.
pub fn apply_highpass(data: &mut Array2<f64>, f: &Array2<f64>) -> Result<()> {
    let ntp = data.nrows();
    if f.dim() != (ntp, ntp) {
        return Err(DesignError::Linalg(format!(
            "filter of shape {:?} for {ntp} timepoints",
            f.dim()
        )));
    }
    let filtered = f.dot(&*data);
    data.assign(&filtered);
    Ok(())
}

/// Highpass filter a copy of `data` (`[T, N]`), one column per signal.
pub fn highpass_filter(data: &Array2<f64>, cutoff: f64, tr: f64) -> Result<Array2<f64>> {
    let f = highpass_matrix(data.nrows(), cutoff, tr)?;
    let mut out = data.clone();
    apply_highpass(&mut out, &f)?;
    Ok(out)
}

/// Highpass filter a single signal.
pub fn filter_signal(x: ArrayView1<'_, f64>, cutoff: f64, tr: f64) -> Result<Array1<f64>> {
    let f = highpass_matrix(x.len(), cutoff, tr)?;
    Ok(f.dot(&x))
}
