//! Named-column, time-indexed real matrix.
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{DesignError, Result};

/// A `[T, N]` matrix with one name per column and one timestamp per row.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorTable {
    names: Vec<String>,
    index: Array1<f64>,
    data: Array2<f64>,
}

impl RegressorTable {
    /// Wrap `data` (`[T, N]`) with column `names` and row `index`.
    pub fn new(names: Vec<String>, index: Array1<f64>, data: Array2<f64>) -> Result<Self> {
        if names.len() != data.ncols() {
            return Err(DesignError::Configuration(format!(
                "{} column names for {} columns",
                names.len(),
                data.ncols()
            )));
        }
        if index.len() != data.nrows() {
            return Err(DesignError::Configuration(format!(
                "index of length {} for {} rows",
                index.len(),
                data.nrows()
            )));
        }
        Ok(Self { names, index, data })
    }

    /// A table indexed by the positional range `0, 1, …, T−1`.
    pub fn positional(names: Vec<String>, data: Array2<f64>) -> Result<Self> {
        let index = Array1::from_shape_fn(data.nrows(), |i| i as f64);
        Self::new(names, index, data)
    }

    /// An empty table (no columns) on `index`.
    pub fn empty(index: Array1<f64>) -> Self {
        let data = Array2::zeros((index.len(), 0));
        Self { names: Vec::new(), index, data }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index(&self) -> &Array1<f64> {
        &self.index
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.position(name).map(|j| self.data.column(j))
    }

    /// Copy of the columns at `positions`, in that order.
    pub fn select(&self, positions: &[usize]) -> Self {
        let names = positions.iter().map(|&j| self.names[j].clone()).collect();
        let data = self.data.select(Axis(1), positions);
        Self { names, index: self.index.clone(), data }
    }

    pub fn into_parts(self) -> (Vec<String>, Array1<f64>, Array2<f64>) {
        (self.names, self.index, self.data)
    }

    pub(crate) fn set_names(&mut self, names: Vec<String>) {
        debug_assert_eq!(names.len(), self.data.ncols());
        self.names = names;
    }

    pub(crate) fn set_index(&mut self, index: Array1<f64>) {
        debug_assert_eq!(index.len(), self.data.nrows());
        self.index = index;
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }

    /// Concatenate tables column-wise.  All must share the row count; the
    /// index of the first table is kept.
    pub fn hstack(tables: &[&RegressorTable]) -> Result<Self> {
        let Some(first) = tables.first() else {
            return Err(DesignError::Configuration("nothing to concatenate".into()));
        };
        let views: Vec<_> = tables.iter().map(|t| t.data.view()).collect();
        let data = ndarray::concatenate(Axis(1), &views)
            .map_err(|e| DesignError::Linalg(format!("column concatenation failed: {e}")))?;
        let names = tables.iter().flat_map(|t| t.names.iter().cloned()).collect();
        Ok(Self { names, index: first.index.clone(), data })
    }
}
