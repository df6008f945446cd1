//! Experimental events and their hires boxcar encoding.
//!
//! Each condition becomes one dense step function on the hires grid, built
//! with a cumulative sum over `+amplitude` at the onset sample and
//! `−amplitude` at the offset sample:
//!
//! ```text
//! delta:   0  0 +a  0  0 −a  0        onset j₀ = searchsorted(hires, onset)
//! cumsum:  0  0  a  a  a  0  0        offset j₁ = searchsorted(hires, onset + duration)
//! ```
//!
//! Both indices are clamped to the last hires sample.  When the offset lands on
//! the onset (zero or sub-sample duration) it is advanced by one sample so the
//! event still contributes a one-sample impulse, unless the onset already sits
//! on the final sample, in which case the event vanishes.
use std::collections::BTreeSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result};
use crate::grid::searchsorted;

/// One row of the event table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub condition: String,
    /// Onset in seconds.
    pub onset: f64,
    /// Duration in seconds (`0` is an impulse).
    #[serde(default)]
    pub duration: f64,
    /// Amplitude of the boxcar.
    #[serde(default = "default_value", alias = "amplitude")]
    pub value: f64,
}

fn default_value() -> f64 {
    1.0
}

impl Event {
    /// An impulse event with unit amplitude.
    pub fn new(condition: impl Into<String>, onset: f64) -> Self {
        Self { condition: condition.into(), onset, duration: 0.0, value: 1.0 }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }
}

/// Check that every event has a finite onset, a finite non-negative duration
/// and a finite amplitude.
pub fn validate_events(events: &[Event]) -> Result<()> {
    for (i, ev) in events.iter().enumerate() {
        if !ev.onset.is_finite() {
            return Err(DesignError::Configuration(format!(
                "event {i} ({}) has non-finite onset",
                ev.condition
            )));
        }
        if !(ev.duration.is_finite() && ev.duration >= 0.0) {
            return Err(DesignError::Configuration(format!(
                "event {i} ({}) has invalid duration {}",
                ev.condition, ev.duration
            )));
        }
        if !ev.value.is_finite() {
            return Err(DesignError::Configuration(format!(
                "event {i} ({}) has non-finite value",
                ev.condition
            )));
        }
    }
    Ok(())
}

/// Resolve the ordered list of modelled conditions.
///
/// With no explicit subset this is the sorted set of labels in `events`.  An
/// explicit subset may reorder or drop conditions but every entry must occur in
/// the table.
pub fn condition_names(events: &[Event], subset: Option<&[String]>) -> Result<Vec<String>> {
    let present: BTreeSet<&str> = events.iter().map(|e| e.condition.as_str()).collect();
    match subset {
        None => Ok(present.into_iter().map(String::from).collect()),
        Some(names) => {
            let mut seen = BTreeSet::new();
            for name in names {
                if !present.contains(name.as_str()) {
                    return Err(DesignError::Configuration(format!(
                        "condition '{name}' not found in event table"
                    )));
                }
                if !seen.insert(name.as_str()) {
                    return Err(DesignError::Configuration(format!(
                        "condition '{name}' listed twice"
                    )));
                }
            }
            Ok(names.to_vec())
        }
    }
}

/// Encode the events of one condition as a hires boxcar timecourse.
///
/// `hires` must be sorted ascending.  Events outside the grid are clamped to
/// its last sample.
pub fn encode_condition<'a, I>(events: I, hires: &[f64]) -> Array1<f64>
where
    I: IntoIterator<Item = &'a Event>,
{
    let tmax = hires.len();
    let mut ev = Array1::<f64>::zeros(tmax);
    if tmax == 0 {
        return ev;
    }
    let last = tmax - 1;

    for event in events {
        let t_onset = searchsorted(hires, event.onset).min(last);
        let mut t_offset = searchsorted(hires, event.onset + event.duration).min(last);
        if t_offset == t_onset && t_offset < last {
            t_offset += 1;
        }
        ev[t_onset] += event.value;
        ev[t_offset] -= event.value;
    }

    let mut acc = 0.0;
    for v in ev.iter_mut() {
        acc += *v;
        *v = acc;
    }
    ev
}
