mod common;
use fmri_design::{GammaDifferenceHrf, GammaParams, HrfModel, IdentityHrf};
use ndarray::Array1;

#[test]
fn kernel_sums_to_one_for_any_parameters() {
    let cases = [
        GammaParams::default(),
        GammaParams { pos_shape: 4.0, pos_scale: 1.5, ..GammaParams::default() },
        GammaParams { neg_shape: 12.0, neg_scale: 0.8, ratio: 0.35, ..GammaParams::default() },
        GammaParams { kernel_secs: 20.0, ratio: 0.0, ..GammaParams::default() },
    ];
    for (i, params) in cases.into_iter().enumerate() {
        for (tr, os) in [(2.0, 16), (0.72, 10), (3.0, 1)] {
            let hrf = GammaDifferenceHrf::new(params.clone(), tr, os).unwrap();
            let k = hrf.kernel();
            approx::assert_abs_diff_eq!(k.column(0).sum(), 1.0, epsilon = 1e-10);
            assert!(k.iter().all(|v| v.is_finite()), "case {i} tr={tr}");
        }
    }
}

#[test]
fn derivative_energy_matches_main_kernel() {
    let params = GammaParams { temporal_deriv: true, ..GammaParams::default() };
    for (tr, os) in [(2.0, 16), (1.0, 8)] {
        let k = GammaDifferenceHrf::new(params.clone(), tr, os).unwrap().kernel();
        let main: f64 = k.column(0).iter().map(|v| v * v).sum();
        let deriv: f64 = k.column(1).iter().map(|v| v * v).sum();
        approx::assert_abs_diff_eq!(main, deriv, epsilon = 1e-12);
    }
}

#[test]
fn canonical_kernel_peaks_near_five_seconds() {
    let hrf = GammaDifferenceHrf::canonical(2.0, 16).unwrap();
    let k = hrf.kernel();
    let peak = common::argmax(k.column(0));
    // linspace(0, 32, 256): spacing 32 / 255 s
    let t_peak = peak as f64 * 32.0 / 255.0;
    assert!((4.5..5.5).contains(&t_peak), "peak at {t_peak} s");
    // undershoot
    assert!(k.column(0).iter().any(|&v| v < 0.0));
}

#[test]
fn convolution_is_causal_prefix() {
    let hrf = GammaDifferenceHrf::canonical(2.0, 16).unwrap();
    let mut x = Array1::<f64>::zeros(400);
    x[100] = 1.0;
    let out = hrf.convolve(x.view(), None, Some("imp")).unwrap();
    let k = hrf.kernel();
    let y = out.column("imp").unwrap();
    for j in 0..100 {
        approx::assert_abs_diff_eq!(y[j], 0.0, epsilon = 1e-12);
    }
    for j in 0..256 {
        approx::assert_abs_diff_eq!(y[100 + j], k[[j, 0]], epsilon = 1e-12);
    }
}

#[test]
fn truncation_drops_kernel_tail() {
    let hrf = GammaDifferenceHrf::canonical(2.0, 16).unwrap();
    let mut x = Array1::<f64>::zeros(64);
    x[0] = 1.0;
    let out = hrf.convolve(x.view(), None, None).unwrap();
    assert_eq!(out.nrows(), 64);
    assert_eq!(out.names(), &["event".to_string()]);
}

#[test]
fn derivative_model_outputs_two_columns() {
    let params = GammaParams { temporal_deriv: true, ..GammaParams::default() };
    let hrf = GammaDifferenceHrf::new(params, 2.0, 16).unwrap();
    let x = Array1::<f64>::ones(160);
    let ft = Array1::from_shape_fn(160, |i| i as f64 * 0.125);
    let out = hrf.convolve(x.view(), Some(&ft), Some("cue")).unwrap();
    assert_eq!(out.names(), &["cue".to_string(), "cue_deriv".to_string()]);
    assert_eq!(out.index(), &ft);
}

#[test]
fn mismatched_frametimes_rejected() {
    let hrf = IdentityHrf::new(2.0, 16);
    let x = Array1::<f64>::ones(10);
    let ft = Array1::<f64>::zeros(9);
    assert!(hrf.convolve(x.view(), Some(&ft), None).is_err());
}
