//! Plain serialisable snapshot of a [`DesignMatrix`](crate::DesignMatrix).
//!
//! Carries only values (names, frame times, matrix rows, column groups and
//! diagnostics), never builder or model state, so the persisted format is
//! independent of how the design was constructed.
use serde::{Deserialize, Serialize};

use crate::design::ColumnGroup;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRecord {
    pub column_names: Vec<String>,
    pub groups: Vec<ColumnGroup>,
    pub frametimes: Vec<f64>,
    /// Row-major, one inner vector per frame.
    pub matrix: Vec<Vec<f64>>,
    pub pp_heights: Vec<f64>,
    pub singular_values: Vec<f64>,
    pub tr: f64,
}

impl DesignRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
