use std::sync::Arc;

use strata_animation_core::{
    AnimationClip, AnimationLayer, ChannelBlender, ClipChannel, EntityId, Keyframe, KeyframeCurve, LayerPhase,
    LayerPool, PlayOptions, PropertyKind, SceneTree, TargetRef,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn constant_clip(name: &str, value: f32) -> Arc<AnimationClip> {
    let keys = vec![
        Keyframe { time: 0.0, value: vec![value] },
        Keyframe { time: 1.0, value: vec![value] },
    ];
    Arc::new(AnimationClip::new(name, vec![ClipChannel::new("node", "scale", KeyframeCurve::new(keys))]).unwrap())
}

fn scene() -> (SceneTree, EntityId, EntityId) {
    let mut scene = SceneTree::new();
    let root = scene.add_node("root", None);
    let node = scene.add_node("node", Some(root));
    (scene, root, node)
}

/// it should ramp the layer weight in linearly over the fade duration
#[test]
fn cross_fade_in_ramps_weight() {
    let (scene, root, _) = scene();
    let mut layer = AnimationLayer::new();
    layer.play(Some(constant_clip("a", 1.0)), &scene, root, &PlayOptions::looped());
    layer.cross_fade_in(2000.0);
    assert_eq!(layer.layer_weight(), 0.0);
    assert_eq!(layer.phase(), LayerPhase::CrossFading);

    layer.update_state(1000.0);
    assert_eq!(layer.layer_weight(), 0.5);
    assert!(layer.is_cross_fading());

    layer.update_state(1000.0);
    assert_eq!(layer.layer_weight(), 1.0);
    assert!(!layer.is_cross_fading());
    assert_eq!(layer.phase(), LayerPhase::Playing);

    layer.update_state(1000.0);
    assert_eq!(layer.layer_weight(), 1.0);
}

/// it should jump straight to full weight for a non-positive duration
#[test]
fn zero_cross_fade_is_instant() {
    let (scene, root, _) = scene();
    let mut layer = AnimationLayer::new();
    layer.play(Some(constant_clip("a", 1.0)), &scene, root, &PlayOptions::looped());
    layer.cross_fade_in(0.0);
    assert_eq!(layer.layer_weight(), 1.0);
    assert!(!layer.is_cross_fading());
}

/// it should ramp the weight out and stop at zero
#[test]
fn fade_out_stops_layer() {
    let (scene, root, _) = scene();
    let mut layer = AnimationLayer::new();
    layer.play(Some(constant_clip("a", 1.0)), &scene, root, &PlayOptions::looped());
    layer.fade_out(1000.0);
    assert_eq!(layer.phase(), LayerPhase::Fading);

    let tick = layer.update_state(500.0);
    assert!(!tick.stopped);
    assert_eq!(layer.layer_weight(), 0.5);

    let tick = layer.update_state(500.0);
    assert!(tick.stopped);
    assert_eq!(layer.layer_weight(), 0.0);
    assert_eq!(layer.phase(), LayerPhase::Idle);
}

/// it should not be mixable while fading out
#[test]
fn fading_layer_can_not_be_mixed() {
    let (scene, root, _) = scene();
    let mut layer = AnimationLayer::new();
    let clip = constant_clip("a", 1.0);
    layer.play(Some(clip.clone()), &scene, root, &PlayOptions::looped());
    assert!(layer.can_mix(&clip, &scene, root));
    layer.fade_out(1000.0);
    assert!(!layer.can_mix(&clip, &scene, root));
}

/// it should blend outgoing and incoming layers through a pool cross-fade
#[test]
fn pool_cross_fade_blends_to_new_clip() {
    let (mut scene, root, node) = scene();
    let mut pool = LayerPool::default();
    let from = pool.create_layer();
    let from_targets = pool
        .play(from, Some(constant_clip("from", 0.0)), &scene, root, &PlayOptions::looped())
        .unwrap();
    let (to, to_targets) = pool
        .cross_fade(from, constant_clip("to", 10.0), &scene, root, 1000.0, &PlayOptions::looped())
        .unwrap();
    assert_ne!(from, to);

    let target = TargetRef::Entity(node);
    let mut blender = ChannelBlender::new();
    let mut frame = |pool: &LayerPool, scene: &mut SceneTree| {
        blender.begin_frame();
        pool.accumulate(from, &from_targets, &mut blender);
        pool.accumulate(to, &to_targets, &mut blender);
        blender.apply(scene);
    };

    pool.update_all(500.0);
    frame(&pool, &mut scene);
    approx(scene.value(target, &PropertyKind::Scale).unwrap()[0], 5.0, 1e-5);

    pool.update_all(500.0);
    frame(&pool, &mut scene);
    assert!(!pool.get(from).unwrap().is_playing());
    assert_eq!(pool.get(to).unwrap().layer_weight(), 1.0);
    approx(scene.value(target, &PropertyKind::Scale).unwrap()[0], 10.0, 1e-5);

    assert_eq!(pool.remove_idle_layers(), 1);
    assert!(!pool.contains(from));
    assert_eq!(pool.len(), 1);
}
