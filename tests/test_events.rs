mod common;
use fmri_design::{encode_condition, Event, FrameGrid};

fn hires() -> Vec<f64> {
    FrameGrid::new(10, 2.0, 16).unwrap().hires().to_vec()
}

#[test]
fn zero_duration_event_is_single_sample() {
    let hires = hires();
    let ev = encode_condition(&[Event::new("a", 4.0).with_value(2.5)], &hires);
    // onset 4 s at dt 0.125 → sample 32
    assert_eq!(ev[32], 2.5);
    assert_eq!(ev.iter().filter(|&&v| v != 0.0).count(), 1);
}

#[test]
fn zero_duration_event_on_last_sample_vanishes() {
    let hires = hires();
    let last = *hires.last().unwrap();
    let ev = encode_condition(&[Event::new("a", last)], &hires);
    assert!(ev.iter().all(|&v| v == 0.0), "boundary event should contribute nothing");
}

#[test]
fn onset_past_grid_end_vanishes() {
    let ev = encode_condition(&[Event::new("a", 500.0).with_duration(3.0)], &hires());
    assert!(ev.iter().all(|&v| v == 0.0));
}

#[test]
fn gap_between_events_returns_to_zero() {
    let hires = hires();
    let events = [
        Event::new("a", 1.0).with_duration(2.0).with_value(0.7),
        Event::new("a", 6.0).with_duration(2.0).with_value(0.7),
    ];
    let ev = encode_condition(&events, &hires);
    // 1–3 s → samples 8..24, 6–8 s → samples 48..64
    for j in 8..24 {
        assert_eq!(ev[j], 0.7, "sample {j}");
    }
    for j in 24..48 {
        assert_eq!(ev[j], 0.0, "leak at sample {j}");
    }
    for j in 48..64 {
        assert_eq!(ev[j], 0.7, "sample {j}");
    }
    assert!(ev.iter().skip(64).all(|&v| v == 0.0));
}

#[test]
fn trailing_boxcar_clamped_to_grid() {
    let hires = hires();
    let ev = encode_condition(&[Event::new("a", 18.0).with_duration(10.0)], &hires);
    // Offset clamps to the last sample, which therefore stays at zero.
    assert_eq!(ev[144], 1.0);
    assert_eq!(ev[158], 1.0);
    assert_eq!(ev[159], 0.0);
}

#[test]
fn events_of_other_conditions_are_ignored_by_caller_filtering() {
    let events = vec![Event::new("a", 2.0), Event::new("b", 4.0)];
    let hires = hires();
    let ev = encode_condition(events.iter().filter(|e| e.condition == "a"), &hires);
    assert_eq!(ev[16], 1.0);
    assert_eq!(ev[32], 0.0);
}
