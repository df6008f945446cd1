//! Validation of externally supplied regressors, confounds and artifacts.
//!
//! Inputs may be raw `[T, N]` arrays or [`RegressorTable`]s.  Unnamed inputs
//! (and tables whose names are just `"0", "1", …`) get `"{base}_0",
//! "{base}_1", …`.  The row index must either equal the acquisition frame
//! times or be the positional range `0..T`; in both cases the result is
//! re-indexed onto the frame times.  Anything else is an alignment error.
use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{DesignError, Result};
use crate::table::RegressorTable;

/// An external design component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentInput {
    /// Unnamed `[T, N]` array; rows are acquisitions.
    Array(Array2<f64>),
    /// Named, indexed table.
    Table(RegressorTable),
}

impl From<Array2<f64>> for ComponentInput {
    fn from(a: Array2<f64>) -> Self {
        ComponentInput::Array(a)
    }
}

impl From<RegressorTable> for ComponentInput {
    fn from(t: RegressorTable) -> Self {
        ComponentInput::Table(t)
    }
}

/// `["{base}_0", "{base}_1", …]`.
pub fn default_names(base: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{base}_{i}")).collect()
}

fn is_positional_names(names: &[String]) -> bool {
    names.iter().enumerate().all(|(i, n)| n.parse::<usize>() == Ok(i))
}

fn index_matches(index: ArrayView1<'_, f64>, expected: impl Iterator<Item = f64>) -> bool {
    index.iter().zip(expected).all(|(&a, b)| a == b)
}

/// Normalise one component onto `frametimes`.
///
/// Returns `Ok(None)` when `comp` is `None`.
pub fn validate_component(
    comp: Option<ComponentInput>,
    base: &str,
    frametimes: &Array1<f64>,
) -> Result<Option<RegressorTable>> {
    let Some(comp) = comp else {
        return Ok(None);
    };
    let ntp = frametimes.len();

    let mut table = match comp {
        ComponentInput::Array(a) => {
            if a.nrows() != ntp {
                return Err(DesignError::alignment(
                    base,
                    format!("{} rows for {ntp} frames", a.nrows()),
                ));
            }
            let names = default_names(base, a.ncols());
            RegressorTable::new(names, frametimes.clone(), a)?
        }
        ComponentInput::Table(t) => t,
    };

    if table.nrows() != ntp {
        return Err(DesignError::alignment(
            base,
            format!("{} rows for {ntp} frames", table.nrows()),
        ));
    }

    if is_positional_names(table.names()) {
        table.set_names(default_names(base, table.ncols()));
    }

    let index = table.index().view();
    let aligned = index_matches(index, frametimes.iter().copied())
        || index_matches(index, (0..ntp).map(|i| i as f64));
    if !aligned {
        return Err(DesignError::alignment(
            base,
            "index is neither the acquisition frametimes nor a positional range",
        ));
    }
    table.set_index(frametimes.clone());

    Ok(Some(table))
}

/// Expand a boolean frame mask into one indicator column per flagged frame.
///
/// An all-`false` mask yields `None`.
pub fn expand_artifacts(mask: &[bool]) -> Option<Array2<f64>> {
    let flagged: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &bad)| bad.then_some(i))
        .collect();
    if flagged.is_empty() {
        return None;
    }
    let mut art = Array2::<f64>::zeros((mask.len(), flagged.len()));
    for (col, &frame) in flagged.iter().enumerate() {
        art[[frame, col]] = 1.0;
    }
    Some(art)
}

/// Validate an artifact mask against the frame grid and expand it.
pub fn validate_artifacts(
    mask: Option<&[bool]>,
    frametimes: &Array1<f64>,
) -> Result<Option<RegressorTable>> {
    let Some(mask) = mask else {
        return Ok(None);
    };
    if mask.len() != frametimes.len() {
        return Err(DesignError::alignment(
            "artifact",
            format!("mask of length {} for {} frames", mask.len(), frametimes.len()),
        ));
    }
    match expand_artifacts(mask) {
        Some(art) => validate_component(Some(ComponentInput::Array(art)), "artifact", frametimes),
        None => {
            tracing::debug!("artifact mask flags no frames; omitting artifact submatrix");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn frametimes() -> Array1<f64> {
        array![0.0, 2.0, 4.0, 6.0]
    }

    #[test]
    fn array_gets_default_names() {
        let t = validate_component(Some(Array2::zeros((4, 2)).into()), "confound", &frametimes())
            .unwrap()
            .unwrap();
        assert_eq!(t.names(), &["confound_0".to_string(), "confound_1".to_string()]);
        assert_eq!(t.index(), &frametimes());
    }

    #[test]
    fn numeric_table_names_replaced() {
        let table = RegressorTable::positional(vec!["0".into()], Array2::zeros((4, 1))).unwrap();
        let t = validate_component(Some(table.into()), "regressor", &frametimes()).unwrap().unwrap();
        assert_eq!(t.names(), &["regressor_0".to_string()]);
    }

    #[test]
    fn positional_index_reindexed() {
        let table = RegressorTable::positional(vec!["motion".into()], Array2::ones((4, 1))).unwrap();
        let t = validate_component(Some(table.into()), "confound", &frametimes()).unwrap().unwrap();
        assert_eq!(t.index(), &frametimes());
        assert_eq!(t.names(), &["motion".to_string()]);
    }

    #[test]
    fn mismatched_index_rejected() {
        let table = RegressorTable::new(
            vec!["motion".into()],
            array![0.0, 1.5, 3.0, 4.5],
            Array2::ones((4, 1)),
        )
        .unwrap();
        let err = validate_component(Some(table.into()), "confound", &frametimes()).unwrap_err();
        assert!(matches!(err, DesignError::Alignment { .. }));
    }

    #[test]
    fn wrong_row_count_rejected() {
        let err = validate_component(Some(Array2::zeros((3, 1)).into()), "regressor", &frametimes())
            .unwrap_err();
        assert!(matches!(err, DesignError::Alignment { .. }));
    }

    #[test]
    fn artifacts_one_hot() {
        let art = expand_artifacts(&[false, true, false, true]).unwrap();
        assert_eq!(art, array![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn empty_artifact_mask_is_none() {
        assert!(expand_artifacts(&[false; 4]).is_none());
        assert!(validate_artifacts(Some(&[false; 4]), &frametimes()).unwrap().is_none());
    }
}
