//! # fmri-design — GLM design matrices for fMRI in pure Rust
//!
//! `fmri-design` turns a table of experimental events into the regressors of
//! a General Linear Model, aligned to the acquisition grid of a BOLD time
//! series.  The construction follows FSL FEAT: double-gamma HRF, oversampled
//! convolution, mid-TR subsampling, Gaussian running-line highpass filter and
//! demeaned columns (no constant regressor).
//!
//! ## Pipeline overview
//!
//! ```text
//! events (condition, onset, duration, value)
//!   │
//!   ├─ events::encode_condition()   hires boxcar per condition (TR / 16)
//!   ├─ hrf::HrfModel::convolve()    double-gamma (+ temporal derivative)
//!   ├─ resample::resample()         nearest sample at t + TR/2
//!   ├─ normalize                    demean, peak-to-peak heights
//!   ├─ filter::highpass_matrix()    F = I − H, Gaussian local-linear fit
//!   ├─ component                    regressors / confounds (PCA?) / artifacts
//!   └─ design                       concat → demean → SVD diagnostics
//!        │
//!        └─→ DesignMatrix  [ntp, conditions | regressors | confounds | artifacts]
//! ```
//!
//! ## Quick start
//!
//! ```
//! use fmri_design::{build_design, DesignConfig, Event, HrfSpec};
//!
//! let events = vec![
//!     Event::new("faces", 10.0).with_duration(4.0),
//!     Event::new("houses", 30.0).with_duration(4.0),
//!     Event::new("faces", 50.0).with_duration(4.0),
//! ];
//! let design = build_design(&events, &HrfSpec::default(), 60, &DesignConfig::default()).unwrap();
//!
//! assert_eq!(design.shape(), (60, 2));
//! let c = design.contrast_vector(&["faces", "houses"], &[1.0, -1.0]).unwrap();
//! assert_eq!(c.len(), 2);
//! ```
//!
//! ## Adding nuisance regressors
//!
//! ```
//! use fmri_design::{DesignConfig, DesignMatrix, Event, GammaDifferenceHrf};
//! use ndarray::Array2;
//!
//! let events = vec![Event::new("task", 0.0).with_duration(20.0)];
//! let hrf = GammaDifferenceHrf::canonical(2.0, 16).unwrap();
//! let motion = Array2::from_shape_fn((50, 6), |(t, c)| ((t * (c + 1)) as f64 * 0.1).sin());
//! let mut mask = vec![false; 50];
//! mask[17] = true;
//!
//! let design = DesignMatrix::builder(&events, &hrf, 50)
//!     .config(DesignConfig::default())
//!     .confounds(motion)
//!     .artifacts(mask)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.confound_submatrix().unwrap().ncols(), 6);
//! assert_eq!(design.artifact_submatrix().unwrap().names(), &["artifact_0".to_string()]);
//! ```

pub mod component;
pub mod config;
pub mod design;
pub mod error;
pub mod events;
pub mod filter;
pub mod grid;
pub mod hrf;
pub mod normalize;
pub mod record;
pub mod reduce;
pub mod resample;
pub mod table;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{DesignConfig, GammaParams, HrfSpec};

// error
pub use error::{DesignError, Result};

// events + grid
pub use events::{condition_names, encode_condition, Event};
pub use grid::FrameGrid;

// hrf
pub use hrf::{convolve_causal, FirHrf, GammaDifferenceHrf, HrfModel, IdentityHrf};

// resample + filter + normalize
pub use filter::{highpass_filter, highpass_matrix};
pub use normalize::{demean_columns_inplace, peak_to_peak};
pub use resample::{resample, resample_1d};

// components
pub use component::{expand_artifacts, validate_component, ComponentInput};
pub use reduce::{ConfoundReducer, PcaReducer};
pub use table::RegressorTable;

// design
pub use design::{ColumnGroup, DesignMatrix, DesignMatrixBuilder, Submatrix};
pub use record::DesignRecord;

/// Build a design matrix from events alone.
///
/// Instantiates the HRF described by `hrf` at `cfg.tr` / `cfg.oversampling`
/// and runs the full pipeline.  Use [`DesignMatrix::builder`] to add
/// regressors, confounds or an artifact mask.
///
/// # Errors
///
/// * [`DesignError::UnsupportedModel`] for [`HrfSpec::Fir`].
/// * [`DesignError::Configuration`] for invalid parameters or events.
pub fn build_design(
    events: &[Event],
    hrf: &HrfSpec,
    ntp: usize,
    cfg: &DesignConfig,
) -> Result<DesignMatrix> {
    let model = hrf.build(cfg.tr, cfg.oversampling)?;
    DesignMatrixBuilder::new(events, model.as_ref(), ntp)
        .config(cfg.clone())
        .build()
}
