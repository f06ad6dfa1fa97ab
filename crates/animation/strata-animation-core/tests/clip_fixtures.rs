use std::sync::Arc;

use strata_animation_core::{
    parse_clip_json, AnimationClip, AnimationLayer, ClipError, Interpolation, PlayOptions, PropertyKind, SceneTree,
    TargetRef,
};
use strata_test_fixtures::clips;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn load(name: &str) -> AnimationClip {
    let json = clips::json(name).expect("fixture");
    parse_clip_json(&json).unwrap_or_else(|e| panic!("{name}: {e}"))
}

/// it should parse every clip listed in the fixture manifest
#[test]
fn all_fixture_clips_parse() {
    let keys = clips::keys();
    assert_eq!(keys, vec!["blink", "walk", "wave"]);
    for key in keys {
        let clip = load(&key);
        let entry = clips::entry(&key).unwrap();
        assert_eq!(clip.name(), key);
        approx(clip.duration(), entry.duration, 1e-6);
        assert_eq!(clip.channel_count(), entry.channels);
    }
}

/// it should read channel layout, property kinds and durations
#[test]
fn walk_layout() {
    let walk = load("walk");
    assert_eq!(walk.channel_count(), 3);
    assert_eq!(walk.duration(), 1.0);
    assert_eq!(walk.duration_index(), 0);
    assert_eq!(walk.channel(0).unwrap().kind(), &PropertyKind::Position);
    assert_eq!(walk.channel(2).unwrap().kind(), &PropertyKind::Rotation);
    assert_eq!(walk.channel(2).unwrap().curve.value_size(), 4);
}

/// it should honour explicit length and step interpolation
#[test]
fn blink_holds_keys_and_extends_past_last_key() {
    let blink = load("blink");
    let curve = &blink.channel(0).unwrap().curve;
    assert_eq!(curve.interpolation(), Interpolation::Step);
    approx(blink.duration(), 0.4, 1e-6);
    assert_eq!(curve.keys().len(), 3);

    // Same document through the generic serde path.
    let raw: serde_json::Value = clips::load("blink").unwrap();
    assert_eq!(raw["channels"][0]["length"], 0.4);
}

/// it should bind weights channels to the blend-weight component
#[test]
fn blink_plays_on_blend_weights() {
    let mut scene = SceneTree::new();
    let root = scene.add_node("head", None);
    let face = scene.add_node("face", Some(root));
    scene.set_blend_weights(face, true);

    let mut layer = AnimationLayer::new();
    let targets = layer
        .play(Some(Arc::new(load("blink"))), &scene, root, &PlayOptions::looped())
        .unwrap();
    assert_eq!(targets[0].target, Some(TargetRef::BlendWeights(face)));
    assert_eq!(targets[0].output_size, 2);

    layer.update_state(150.0);
    assert_eq!(layer.channel_value(0), Some(&[1.0, 1.0][..]));
    layer.update_state(100.0);
    assert_eq!(layer.channel_value(0), Some(&[0.0, 0.0][..]));
}

/// it should leave a weights channel untargeted when the node has no blend weights
#[test]
fn weights_without_component_do_not_bind() {
    let mut scene = SceneTree::new();
    let root = scene.add_node("head", None);
    scene.add_node("face", Some(root));
    let mut layer = AnimationLayer::new();
    let targets = layer
        .play(Some(Arc::new(load("blink"))), &scene, root, &PlayOptions::looped())
        .unwrap();
    assert!(targets[0].target.is_none());
}

/// it should sample quaternion channels as unit rotations
#[test]
fn walk_rotation_stays_normalized() {
    let mut scene = SceneTree::new();
    let root = scene.add_node("rig", None);
    let hips = scene.add_node("hips", Some(root));
    scene.add_node("arm_l", Some(hips));
    scene.add_node("arm_r", Some(hips));

    let mut layer = AnimationLayer::new();
    layer.play(Some(Arc::new(load("walk"))), &scene, root, &PlayOptions::looped());
    layer.update_state(250.0);
    let q = layer.channel_value(1).unwrap();
    let n = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    approx(n, 1.0, 1e-5);
    assert!(q[0] > 0.0 && q[0] < 0.3826834);
}

/// it should report the offending channel for malformed clips
#[test]
fn malformed_clip_reports_channel() {
    let err = parse_clip_json(
        r#"{ "name": "bad", "channels": [
            { "target": "a", "property": "scale", "keys": [ { "time": 0.0, "value": [1] } ] },
            { "target": "b", "property": "scale", "keys": [] }
        ] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ClipError::EmptyCurve { channel: 1, .. }));
    assert_eq!(err.channel(), Some(1));
}
