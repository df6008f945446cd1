//! Gaussian running-line highpass filter.
//!
//! - [`design`]: the `ntp × ntp` residual-forming matrix `F = I − H` of a
//!   Gaussian-weighted local linear fit, matching `fslmaths -bptf`.
//! - [`apply`]: premultiply time × column data by `F`.

pub mod apply;
pub mod design;

pub use apply::{apply_highpass, filter_signal, highpass_filter};
pub use design::{gaussian_weights, highpass_matrix};
