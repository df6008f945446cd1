mod common;
use fmri_design::{resample, resample_1d, DesignError, FrameGrid};
use ndarray::{Array1, Array2};

#[test]
fn constant_signal_resamples_to_constant() {
    for (ntp, tr, os) in [(10, 2.0, 16), (37, 0.8, 5), (12, 3.0, 1)] {
        let g = FrameGrid::new(ntp, tr, os).unwrap();
        let hires = g.hires().to_vec();
        let x = Array1::from_elem(hires.len(), 4.2);
        let y = resample_1d(x.view(), &hires, &g.frametimes().to_vec(), tr).unwrap();
        assert_eq!(y.len(), ntp);
        assert!(y.iter().all(|&v| v == 4.2));
    }
}

#[test]
fn samples_at_half_tr_offset() {
    let g = FrameGrid::new(5, 2.0, 16).unwrap();
    let hires = g.hires().to_vec();
    let x = Array1::from_vec(hires.clone());
    let y = resample_1d(x.view(), &hires, &g.frametimes().to_vec(), 2.0).unwrap();
    for (k, &v) in y.iter().enumerate() {
        approx::assert_abs_diff_eq!(v, 2.0 * k as f64 + 1.0, epsilon = 1e-12);
    }
}

#[test]
fn midpoint_outside_hires_grid_fails() {
    let hires: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
    let data = Array2::<f64>::zeros((10, 1));
    let err = resample(&data, &hires, &[0.0, 4.0], 2.0).unwrap_err();
    assert!(matches!(err, DesignError::Resample { .. }));
}
