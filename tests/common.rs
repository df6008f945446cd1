/// Shared helpers for the integration tests.
use fmri_design::{DesignConfig, Event};
use ndarray::{Array2, ArrayView1};

#[allow(unused)]
/// Default configuration with the highpass filter disabled.
pub fn unfiltered() -> DesignConfig {
    DesignConfig { hpf_cutoff: None, ..DesignConfig::default() }
}

#[allow(unused)]
/// Two-condition block design repeating every 40 s.
pub fn block_events(n_blocks: usize) -> Vec<Event> {
    (0..n_blocks)
        .flat_map(|b| {
            let t = b as f64 * 40.0;
            [
                Event::new("faces", t).with_duration(10.0),
                Event::new("houses", t + 20.0).with_duration(10.0),
            ]
        })
        .collect()
}

#[allow(unused)]
/// Index of the largest element.
pub fn argmax(x: ArrayView1<'_, f64>) -> usize {
    x.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
        .0
}

#[allow(unused)]
/// Largest absolute column mean.
pub fn max_abs_column_mean(data: &Array2<f64>) -> f64 {
    data.columns()
        .into_iter()
        .map(|c| c.mean().unwrap_or(0.0).abs())
        .fold(0.0_f64, f64::max)
}
