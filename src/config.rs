//! Design configuration.
//!
//! [`DesignConfig`] holds every tunable parameter of the design-matrix build.
//! [`GammaParams`] and [`HrfSpec`] describe the hemodynamic model.  All fields
//! default to the FSL-compatible values used by FEAT.
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result};
use crate::hrf::{FirHrf, GammaDifferenceHrf, HrfModel, IdentityHrf};

/// Configuration for a design-matrix build.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use fmri_design::DesignConfig;
///
/// let cfg = DesignConfig {
///     tr:         1.5,     // faster acquisition
///     hpf_cutoff: None,    // skip the highpass filter
///     ..DesignConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Repetition time (acquisition sampling period) in seconds.
    ///
    /// Default: `2.0` s.
    pub tr: f64,

    /// Number of hires samples per acquisition interval.
    ///
    /// Condition timecourses are encoded and convolved on a grid with spacing
    /// `tr / oversampling`, then subsampled to the acquisition grid.
    ///
    /// Default: `16`.
    pub oversampling: usize,

    /// Highpass cutoff in seconds, or `None` to skip filtering.
    ///
    /// Only condition columns are filtered.  Regressors, confounds and
    /// artifacts are passed through; filter them yourself if needed.
    ///
    /// Default: `Some(128.0)` s.
    pub hpf_cutoff: Option<f64>,

    /// Subset and order of conditions to model.
    ///
    /// `None` uses the sorted unique labels of the event table.  Every name
    /// listed here must occur in the table.
    ///
    /// Default: `None`.
    pub condition_names: Option<Vec<String>>,

    /// Reduce the confound submatrix with PCA before assembly.
    ///
    /// Default: `false`.
    pub confound_pca: bool,

    /// Fraction of confound variance retained by the PCA reduction.
    ///
    /// Default: `0.99`.
    pub confound_variance: f64,
}

impl Default for DesignConfig {
    /// TR 2 s · 16× oversampling · 128 s highpass · no confound PCA.
    fn default() -> Self {
        Self {
            tr: 2.0,
            oversampling: 16,
            hpf_cutoff: Some(128.0),
            condition_names: None,
            confound_pca: false,
            confound_variance: 0.99,
        }
    }
}

impl DesignConfig {
    /// Check parameter ranges that do not depend on the event table.
    pub fn validate(&self) -> Result<()> {
        if !(self.tr.is_finite() && self.tr > 0.0) {
            return Err(DesignError::Configuration(format!(
                "tr must be positive, got {}",
                self.tr
            )));
        }
        if self.oversampling == 0 {
            return Err(DesignError::Configuration(
                "oversampling must be at least 1".into(),
            ));
        }
        if let Some(cutoff) = self.hpf_cutoff {
            if !(cutoff.is_finite() && cutoff > 0.0) {
                return Err(DesignError::Configuration(format!(
                    "hpf_cutoff must be positive, got {cutoff}"
                )));
            }
        }
        if !(self.confound_variance > 0.0 && self.confound_variance <= 1.0) {
            return Err(DesignError::Configuration(format!(
                "confound_variance must lie in (0, 1], got {}",
                self.confound_variance
            )));
        }
        Ok(())
    }
}

/// Parameters of the difference-of-gammas HRF.
///
/// Defaults follow FSL's canonical double-gamma: a positive lobe peaking near
/// 5 s and an undershoot one sixth as large peaking near 15 s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaParams {
    /// Add a temporal-derivative channel.  Default: `false`.
    pub temporal_deriv: bool,
    /// Length of the sampled kernel in seconds.  Default: `32.0`.
    pub kernel_secs: f64,
    /// Shape of the positive gamma.  Default: `6.0`.
    pub pos_shape: f64,
    /// Scale of the positive gamma.  Default: `1.0`.
    pub pos_scale: f64,
    /// Shape of the undershoot gamma.  Default: `16.0`.
    pub neg_shape: f64,
    /// Scale of the undershoot gamma.  Default: `1.0`.
    pub neg_scale: f64,
    /// Undershoot amplitude relative to the positive lobe.  Default: `1/6`.
    pub ratio: f64,
}

impl Default for GammaParams {
    fn default() -> Self {
        Self {
            temporal_deriv: false,
            kernel_secs: 32.0,
            pos_shape: 6.0,
            pos_scale: 1.0,
            neg_shape: 16.0,
            neg_scale: 1.0,
            ratio: 1.0 / 6.0,
        }
    }
}

/// Serialisable selection of an HRF model.
///
/// ```
/// use fmri_design::HrfSpec;
///
/// let hrf: HrfSpec = serde_json::from_str(r#"{"model": "identity"}"#).unwrap();
/// assert_eq!(hrf, HrfSpec::Identity);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum HrfSpec {
    Identity,
    GammaDifference(GammaParams),
    Fir,
}

impl Default for HrfSpec {
    fn default() -> Self {
        HrfSpec::GammaDifference(GammaParams::default())
    }
}

impl HrfSpec {
    /// Instantiate the model for the given sampling.
    ///
    /// Fails with [`DesignError::UnsupportedModel`] for [`HrfSpec::Fir`].
    pub fn build(&self, tr: f64, oversampling: usize) -> Result<Box<dyn HrfModel>> {
        match self {
            HrfSpec::Identity => Ok(Box::new(IdentityHrf::new(tr, oversampling))),
            HrfSpec::GammaDifference(params) => Ok(Box::new(GammaDifferenceHrf::new(
                params.clone(),
                tr,
                oversampling,
            )?)),
            HrfSpec::Fir => match FirHrf::new()? {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        DesignConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_tr_rejected() {
        let cfg = DesignConfig { tr: 0.0, ..DesignConfig::default() };
        assert!(matches!(cfg.validate(), Err(DesignError::Configuration(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: DesignConfig = serde_json::from_str(r#"{"tr": 1.0, "hpf_cutoff": null}"#).unwrap();
        assert_eq!(cfg.tr, 1.0);
        assert_eq!(cfg.hpf_cutoff, None);
        assert_eq!(cfg.oversampling, 16);
    }

    #[test]
    fn gamma_model_from_json() {
        let hrf: HrfSpec =
            serde_json::from_str(r#"{"model": "gamma_difference", "temporal_deriv": true}"#)
                .unwrap();
        match hrf {
            HrfSpec::GammaDifference(p) => {
                assert!(p.temporal_deriv);
                assert_eq!(p.pos_shape, 6.0);
            }
            other => panic!("unexpected model {other:?}"),
        }
    }

    #[test]
    fn fir_model_is_unsupported() {
        assert!(matches!(
            HrfSpec::Fir.build(2.0, 16),
            Err(DesignError::UnsupportedModel(_))
        ));
    }
}
