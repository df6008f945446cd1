//! Error types for design-matrix construction.
//!
//! Every failure is reported synchronously at construction time; there is no
//! partially built [`DesignMatrix`](crate::DesignMatrix).

use thiserror::Error;

/// Errors that can occur while building a design matrix.
#[derive(Debug, Error)]
pub enum DesignError {
    /// The requested HRF model has no implementation (e.g. FIR).
    #[error("unsupported HRF model: {0}")]
    UnsupportedModel(String),

    /// An external regressor/confound/artifact input is not aligned to the
    /// acquisition grid.
    #[error("frametimes for {component}s do not match design: {reason}")]
    Alignment { component: String, reason: String },

    /// Invalid parameter or parameter combination.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A resampling midpoint lies outside the hires grid.
    #[error("resample point {time} s outside hires support [{start}, {end}] s")]
    Resample { time: f64, start: f64, end: f64 },

    /// Dense linear algebra failed (non-finite input, shape mismatch).
    #[error("linear algebra failure: {0}")]
    Linalg(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DesignError {
    pub(crate) fn alignment(component: &str, reason: impl Into<String>) -> Self {
        DesignError::Alignment {
            component: component.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DesignError>;
