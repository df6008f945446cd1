//! Hemodynamic response models.
//!
//! A model produces a sampled kernel (`[K, C]`, one column per channel) and
//! convolves a hires timecourse with every channel.  Convolution is the causal
//! prefix of the full linear convolution: the kernel tail that would extend
//! past the end of the signal is dropped.
//!
//! - [`GammaDifferenceHrf`]: canonical double-gamma, optionally with a
//!   temporal-derivative channel of matched energy.
//! - [`IdentityHrf`]: passthrough, for exercising the surrounding pipeline.
//! - [`FirHrf`]: not implemented; construction always fails.
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rustfft::{num_complex::Complex, FftPlanner};
use statrs::distribution::{Continuous, Gamma};

use crate::config::GammaParams;
use crate::error::{DesignError, Result};
use crate::grid::{arange, linspace};
use crate::table::RegressorTable;

/// A hemodynamic response model.
pub trait HrfModel {
    /// Sampled kernel, `[K, C]` with one column per output channel.
    fn kernel(&self) -> Array2<f64>;

    /// Output column names for a condition called `name`.
    fn column_names(&self, name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    /// Repetition time and oversampling the model was configured with.
    fn sampling(&self) -> (f64, usize);

    /// Convolve `data` with every kernel channel.
    ///
    /// The output is indexed by `frametimes` when given; otherwise by a grid of
    /// `len / oversampling` acquisitions at spacing `tr / oversampling`.
    /// `name` defaults to `"event"`.
    fn convolve(
        &self,
        data: ArrayView1<'_, f64>,
        frametimes: Option<&Array1<f64>>,
        name: Option<&str>,
    ) -> Result<RegressorTable> {
        let ntp = data.len();
        let index = output_index(ntp, frametimes, self.sampling())?;
        let names = self.column_names(name.unwrap_or("event"));

        let x = data.to_vec();
        let kernel = self.kernel();
        let mut out = Array2::<f64>::zeros((ntp, kernel.ncols()));
        for (c, channel) in kernel.axis_iter(Axis(1)).enumerate() {
            let y = convolve_causal(&x, &channel.to_vec());
            out.column_mut(c).assign(&ArrayView1::from(&y));
        }
        RegressorTable::new(names, index, out)
    }
}

fn output_index(
    ntp: usize,
    frametimes: Option<&Array1<f64>>,
    (tr, oversampling): (f64, usize),
) -> Result<Array1<f64>> {
    match frametimes {
        Some(ft) if ft.len() == ntp => Ok(ft.clone()),
        Some(ft) => Err(DesignError::Configuration(format!(
            "{} frametimes for a timecourse of length {ntp}",
            ft.len()
        ))),
        None => {
            let dt = tr / oversampling as f64;
            let orig_ntp = ntp as f64 / oversampling as f64;
            let mut index = arange(0.0, orig_ntp * tr, dt);
            // Guard against a one-sample rounding disagreement with the data.
            if index.len() != ntp {
                index = Array1::from_shape_fn(ntp, |i| i as f64 * dt);
            }
            Ok(index)
        }
    }
}

// ── Models ────────────────────────────────────────────────────────────────────

/// HRF that leaves the data untouched.
#[derive(Debug, Clone)]
pub struct IdentityHrf {
    tr: f64,
    oversampling: usize,
}

impl IdentityHrf {
    pub fn new(tr: f64, oversampling: usize) -> Self {
        Self { tr, oversampling }
    }
}

impl HrfModel for IdentityHrf {
    fn kernel(&self) -> Array2<f64> {
        Array2::ones((1, 1))
    }

    fn sampling(&self) -> (f64, usize) {
        (self.tr, self.oversampling)
    }

    fn convolve(
        &self,
        data: ArrayView1<'_, f64>,
        frametimes: Option<&Array1<f64>>,
        name: Option<&str>,
    ) -> Result<RegressorTable> {
        let index = output_index(data.len(), frametimes, self.sampling())?;
        let out = data.to_owned().insert_axis(Axis(1));
        RegressorTable::new(self.column_names(name.unwrap_or("event")), index, out)
    }
}

/// Canonical difference-of-gammas HRF.
///
/// ```text
/// h(t) = Γpdf(t; pos_shape, pos_scale) − ratio · Γpdf(t; neg_shape, neg_scale)
/// h   /= Σ h
/// ```
///
/// evaluated at `linspace(0, kernel_secs, ⌊kernel_secs / dt⌋)`.  With a
/// temporal derivative the second channel is `[0, diff(h)]` rescaled so that
/// `Σ dh² = Σ h²`.
#[derive(Debug, Clone)]
pub struct GammaDifferenceHrf {
    params: GammaParams,
    tr: f64,
    oversampling: usize,
    pos: Gamma,
    neg: Gamma,
    timepoints: Array1<f64>,
}

impl GammaDifferenceHrf {
    pub fn new(params: GammaParams, tr: f64, oversampling: usize) -> Result<Self> {
        if !(tr.is_finite() && tr > 0.0) || oversampling == 0 {
            return Err(DesignError::Configuration(format!(
                "invalid HRF sampling: tr={tr}, oversampling={oversampling}"
            )));
        }
        // statrs parameterises the gamma by rate = 1 / scale.
        let gamma = |shape: f64, scale: f64, which: &str| {
            Gamma::new(shape, 1.0 / scale).map_err(|e| {
                DesignError::Configuration(format!(
                    "{which} gamma (shape={shape}, scale={scale}): {e}"
                ))
            })
        };
        let pos = gamma(params.pos_shape, params.pos_scale, "positive")?;
        let neg = gamma(params.neg_shape, params.neg_scale, "negative")?;
        if !params.ratio.is_finite() {
            return Err(DesignError::Configuration("ratio must be finite".into()));
        }

        let dt = tr / oversampling as f64;
        let n = if params.kernel_secs.is_finite() && params.kernel_secs > 0.0 {
            (params.kernel_secs / dt) as usize
        } else {
            0
        };
        if n < 2 {
            return Err(DesignError::Configuration(format!(
                "kernel of {} s is shorter than two samples at dt={dt}",
                params.kernel_secs
            )));
        }
        let timepoints = linspace(0.0, params.kernel_secs, n);

        let hrf = Self { params, tr, oversampling, pos, neg, timepoints };
        let sum = hrf.raw_response().sum();
        if !sum.is_finite() || sum.abs() < f64::EPSILON {
            return Err(DesignError::Configuration(format!(
                "HRF kernel sums to {sum}; cannot normalise"
            )));
        }
        Ok(hrf)
    }

    /// Canonical model with the default parameters.
    pub fn canonical(tr: f64, oversampling: usize) -> Result<Self> {
        Self::new(GammaParams::default(), tr, oversampling)
    }

    pub fn params(&self) -> &GammaParams {
        &self.params
    }

    fn raw_response(&self) -> Array1<f64> {
        self.timepoints
            .mapv(|t| self.pos.pdf(t) - self.params.ratio * self.neg.pdf(t))
    }
}

impl HrfModel for GammaDifferenceHrf {
    fn kernel(&self) -> Array2<f64> {
        let mut y = self.raw_response();
        let total = y.sum();
        y /= total;

        if !self.params.temporal_deriv {
            return y.insert_axis(Axis(1));
        }

        let mut dy = Array1::<f64>::zeros(y.len());
        for i in 1..y.len() {
            dy[i] = y[i] - y[i - 1];
        }
        let energy = dy.mapv(|v| v * v).sum();
        if energy > 0.0 {
            dy *= (y.mapv(|v| v * v).sum() / energy).sqrt();
        }

        let mut k = Array2::<f64>::zeros((y.len(), 2));
        k.column_mut(0).assign(&y);
        k.column_mut(1).assign(&dy);
        k
    }

    fn column_names(&self, name: &str) -> Vec<String> {
        if self.params.temporal_deriv {
            vec![name.to_string(), format!("{name}_deriv")]
        } else {
            vec![name.to_string()]
        }
    }

    fn sampling(&self) -> (f64, usize) {
        (self.tr, self.oversampling)
    }
}

/// Finite impulse response basis.  Not implemented, and uninhabited.
#[derive(Debug, Clone)]
pub enum FirHrf {}

impl FirHrf {
    /// Always fails with [`DesignError::UnsupportedModel`].
    pub fn new() -> Result<Self> {
        Err(DesignError::UnsupportedModel(
            "FIR basis sets are not implemented".into(),
        ))
    }
}

impl HrfModel for FirHrf {
    fn kernel(&self) -> Array2<f64> {
        match *self {}
    }

    fn sampling(&self) -> (f64, usize) {
        match *self {}
    }
}

// ── Convolution ───────────────────────────────────────────────────────────────

/// First `x.len()` samples of the full linear convolution `x * h`.
///
/// Overlap-add over power-of-two FFT blocks; no zero-phase shift.
pub fn convolve_causal(x: &[f64], h: &[f64]) -> Vec<f64> {
    let n_x = x.len();
    let n_h = h.len();
    if n_x == 0 || n_h == 0 {
        return vec![0.0; n_x];
    }

    let n_fft = choose_fft_len(n_h, n_x);
    let n_seg = n_fft - n_h + 1;

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft_fwd = planner.plan_fft_forward(n_fft);
    let fft_inv = planner.plan_fft_inverse(n_fft);
    let inv_scale = 1.0 / n_fft as f64;

    let mut h_fft: Vec<Complex<f64>> = h
        .iter()
        .map(|&v| Complex { re: v, im: 0.0 })
        .chain(std::iter::repeat(Complex::default()))
        .take(n_fft)
        .collect();
    fft_fwd.process(&mut h_fft);

    let mut y = vec![0.0_f64; n_x];
    for start in (0..n_x).step_by(n_seg) {
        let stop = (start + n_seg).min(n_x);

        let mut buf: Vec<Complex<f64>> = x[start..stop]
            .iter()
            .map(|&v| Complex { re: v, im: 0.0 })
            .chain(std::iter::repeat(Complex::default()))
            .take(n_fft)
            .collect();
        fft_fwd.process(&mut buf);
        for (b, &hf) in buf.iter_mut().zip(h_fft.iter()) {
            *b *= hf;
        }
        fft_inv.process(&mut buf);

        let out_end = (start + n_fft).min(n_x);
        for (o, b) in (start..out_end).zip(buf.iter()) {
            y[o] += b.re * inv_scale;
        }
    }
    y
}

/// Power-of-two block size minimising
/// `ceil(n_x / (N − n_h + 1)) · N · (log2 N + 1)`.
fn choose_fft_len(n_h: usize, n_x: usize) -> usize {
    let min_fft = 2 * n_h - 1;
    let min_pow = (min_fft as f64).log2().ceil() as u32;
    let max_pow = ((n_x + n_h) as f64).log2().ceil().max(min_pow as f64) as u32;

    let mut best_n = 1_usize << max_pow;
    let mut best_cost = f64::INFINITY;
    for pow in min_pow..=max_pow {
        let n = 1_usize << pow;
        if n < min_fft {
            continue;
        }
        let n_seg = (n - n_h + 1) as f64;
        let cost = (n_x as f64 / n_seg).ceil() * n as f64 * (pow as f64 + 1.0);
        if cost < best_cost {
            best_cost = cost;
            best_n = n;
        }
    }
    best_n
}
