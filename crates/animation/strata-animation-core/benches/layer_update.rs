use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_animation_core::{
    AnimationClip, ChannelBlender, ClipChannel, EntityId, Keyframe, KeyframeCurve, LayerPool, PlayOptions, SceneTree,
};

const CHANNELS: usize = 64;

fn build_rig() -> (SceneTree, EntityId, EntityId) {
    let mut scene = SceneTree::new();
    let root = scene.add_node("root", None);
    let mut parent = root;
    let mut half = root;
    for i in 0..CHANNELS {
        parent = scene.add_node(format!("bone{i}"), Some(parent));
        if i == CHANNELS / 2 {
            half = parent;
        }
    }
    (scene, root, half)
}

fn build_clip(name: &str, phase: f32) -> Arc<AnimationClip> {
    let channels = (0..CHANNELS)
        .map(|i| {
            let keys = (0..=30)
                .map(|k| {
                    let t = k as f32 / 30.0;
                    let angle = (t + phase) * std::f32::consts::TAU * 0.5;
                    Keyframe {
                        time: t,
                        value: vec![angle.sin() * 0.3, 0.0, 0.0, angle.cos()],
                    }
                })
                .collect();
            ClipChannel::new(format!("bone{i}"), "rotation", KeyframeCurve::new(keys))
        })
        .collect();
    Arc::new(AnimationClip::new(name, channels).expect("bench clip"))
}

fn bench_layer_update(c: &mut Criterion) {
    let (mut scene, root, half) = build_rig();
    let mut pool = LayerPool::default();
    let base = pool.create_layer();
    let mixer = pool.create_layer();
    let targets = pool
        .play(base, Some(build_clip("base", 0.0)), &scene, root, &PlayOptions::looped())
        .expect("play");
    pool.mix(mixer, build_clip("mix", 0.25), base, &scene, half, &PlayOptions::new());
    let mut blender = ChannelBlender::new();

    c.bench_function("layer_update_mixed_64ch", |b| {
        b.iter(|| {
            pool.update_all(black_box(16.0));
            blender.begin_frame();
            pool.accumulate(base, &targets, &mut blender);
            pool.accumulate(mixer, &targets, &mut blender);
            blender.apply(&mut scene);
        })
    });
}

criterion_group!(benches, bench_layer_update);
criterion_main!(benches);
