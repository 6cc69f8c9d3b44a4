use super::*;

fn num(v: &Option<KeyframeValue>) -> f64 {
    v.as_ref().and_then(KeyframeValue::as_number).unwrap()
}

fn ramp(easing: Ease) -> Vec<Keyframe> {
    vec![
        Keyframe::new(0.0, 0.0, easing),
        Keyframe::new(10.0, 100.0, Ease::Linear),
    ]
}

#[test]
fn empty_track_samples_to_none() {
    assert!(sample_keyframes(&[], 1.0).is_none());
}

#[test]
fn non_finite_input_samples_to_none() {
    assert!(sample_keyframes(&ramp(Ease::Linear), f64::NAN).is_none());
    let bad = vec![Keyframe::new(f64::INFINITY, 1.0, Ease::Linear)];
    assert!(sample_keyframes(&bad, 0.0).is_none());
}

#[test]
fn clamps_before_first_and_after_last() {
    let keys = vec![
        Keyframe::new(1.0, 10.0, Ease::OutBack),
        Keyframe::new(2.0, 20.0, Ease::InElastic),
        Keyframe::new(3.0, 5.0, Ease::Linear),
    ];
    for t in [-5.0, 0.0, 1.0] {
        assert_eq!(num(&sample_keyframes(&keys, t)), 10.0);
    }
    for t in [3.0, 3.5, 100.0] {
        assert_eq!(num(&sample_keyframes(&keys, t)), 5.0);
    }
}

#[test]
fn sampling_ignores_input_order() {
    let sorted = vec![
        Keyframe::new(0.0, 0.0, Ease::InQuad),
        Keyframe::new(1.0, 50.0, Ease::OutCubic),
        Keyframe::new(3.0, 20.0, Ease::Linear),
    ];
    let mut shuffled = sorted.clone();
    shuffled.reverse();
    shuffled.swap(0, 1);
    for t in [-1.0, 0.0, 0.3, 1.0, 1.7, 2.9, 3.0, 4.0] {
        assert_eq!(
            sample_keyframes(&sorted, t),
            sample_keyframes(&shuffled, t),
            "t={t}"
        );
    }
}

#[test]
fn linear_midpoint_is_exact() {
    assert_eq!(num(&sample_keyframes(&ramp(Ease::Linear), 5.0)), 50.0);
}

#[test]
fn hold_freezes_until_the_next_key() {
    let keys = ramp(Ease::Hold);
    for t in [0.0, 0.1, 5.0, 9.999] {
        assert_eq!(num(&sample_keyframes(&keys, t)), 0.0, "t={t}");
    }
    assert_eq!(num(&sample_keyframes(&keys, 10.0)), 100.0);
}

#[test]
fn interior_key_time_yields_that_key() {
    let keys = vec![
        Keyframe::new(0.0, 0.0, Ease::Hold),
        Keyframe::new(1.0, 7.0, Ease::Hold),
        Keyframe::new(2.0, 9.0, Ease::Linear),
    ];
    assert_eq!(num(&sample_keyframes(&keys, 1.0)), 7.0);
}

#[test]
fn ease_out_opacity_scenario() {
    let track = PropertyTrack::new(
        AnimatableProperty::Opacity,
        vec![
            Keyframe::new(0.0, 0.0, Ease::from_name("ease-out")),
            Keyframe::new(1.0, 1.0, Ease::Linear),
        ],
    );
    let v = num(&track.sample(0.5));
    assert!((v - 0.75).abs() < 1e-12, "{v}");
}

#[test]
fn duplicate_times_do_not_divide_by_zero() {
    let keys = vec![
        Keyframe::new(0.0, 1.0, Ease::Linear),
        Keyframe::new(1.0, 2.0, Ease::Linear),
        Keyframe::new(1.0, 3.0, Ease::Linear),
        Keyframe::new(2.0, 4.0, Ease::Linear),
    ];
    let v = num(&sample_keyframes(&keys, 1.5));
    assert!(v.is_finite());
    assert_eq!(v, 3.5);
}

#[test]
fn colors_blend_per_channel() {
    let keys = vec![
        Keyframe::new(0.0, "#000000", Ease::Linear),
        Keyframe::new(1.0, "#ffffff", Ease::Linear),
    ];
    let v = sample_keyframes(&keys, 0.5).unwrap();
    assert_eq!(v.as_color(), Some("#808080"));
}

#[test]
fn malformed_colors_step() {
    let keys = vec![
        Keyframe::new(0.0, "blue", Ease::Linear),
        Keyframe::new(1.0, "#ffffff", Ease::Linear),
    ];
    assert_eq!(sample_keyframes(&keys, 0.25).unwrap().as_color(), Some("blue"));
    assert_eq!(sample_keyframes(&keys, 0.75).unwrap().as_color(), Some("#ffffff"));
}

#[test]
fn handled_color_segments_hold_the_start_color() {
    let keys = vec![
        Keyframe::new(0.0, "#000000", Ease::Linear)
            .with_handles(None, Some(Handle { x: 0.5, y: 0.5 })),
        Keyframe::new(1.0, "#ffffff", Ease::Linear),
    ];
    assert_eq!(sample_keyframes(&keys, 0.6).unwrap().as_color(), Some("#000000"));
}

#[test]
fn one_sided_handle_synthesizes_the_other() {
    let keys = vec![
        Keyframe::new(0.0, 0.0, Ease::Hold),
        Keyframe::new(1.0, 1.0, Ease::Linear).with_handles(Some(Handle::DEFAULT_IN), None),
    ];
    let v = num(&sample_keyframes(&keys, 0.5));
    // The handle branch replaces the start key's easing, so hold does not apply.
    assert!((v - 0.5).abs() < 1e-9, "{v}");
}

#[test]
fn keyframes_deserialize_from_editor_json() {
    let json = r##"[
        {"id": "k1", "time": 0, "value": 0, "easing": "ease-in"},
        {"id": "k2", "time": 2, "value": 10, "easing": "no-such-curve",
         "handleIn": {"x": -0.33, "y": 0}},
        {"id": "k3", "time": 0, "value": "#ff0000"}
    ]"##;
    let keys: Vec<Keyframe> = serde_json::from_str(json).unwrap();
    assert_eq!(keys[0].easing, Ease::InQuad);
    assert_eq!(keys[1].easing, Ease::Linear);
    assert_eq!(keys[1].handle_in, Some(Handle::DEFAULT_IN));
    assert_eq!(keys[2].value.as_color(), Some("#ff0000"));
    assert_eq!(keys[2].easing, Ease::Linear);
}
