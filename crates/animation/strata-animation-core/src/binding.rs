//! Channel target resolution.
//!
//! A clip channel names its node relative to the playback root. Resolution
//! happens once per `play`/`mix`; an unresolved channel is logged and plays
//! on with no target (it contributes nothing downstream).

use crate::data::{AnimationClip, PropertyKind};
use crate::scene::{EntityId, SceneLookup, TargetRef};

/// Resolved destination of one clip channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelTarget {
    pub target: Option<TargetRef>,
    pub property: PropertyKind,
    pub output_size: usize,
}

/// Find the node a channel path refers to: the root itself when its name
/// matches, else a descendant by name. `weights` channels bind to the node's
/// blend-weight component instead of the node.
pub fn find_channel_target(
    scene: &dyn SceneLookup,
    root: EntityId,
    path: &str,
    property: &PropertyKind,
) -> Option<TargetRef> {
    let entity = if scene.entity_name(root) == Some(path) {
        Some(root)
    } else {
        scene.find_by_name(root, path)
    }?;

    if matches!(property, PropertyKind::Weights) {
        scene
            .has_blend_weights(entity)
            .then_some(TargetRef::BlendWeights(entity))
    } else {
        Some(TargetRef::Entity(entity))
    }
}

/// Resolve every channel of `clip` under `root`, warning on misses.
pub fn resolve_clip_targets(
    clip: &AnimationClip,
    scene: &dyn SceneLookup,
    root: EntityId,
) -> Vec<ChannelTarget> {
    clip.channels()
        .iter()
        .map(|ch| {
            let target = find_channel_target(scene, root, &ch.relative_path, ch.kind());
            if target.is_none() {
                log::warn!(
                    "clip '{}': can not find channel target '{}' ({})",
                    clip.name(),
                    ch.relative_path,
                    ch.property_name
                );
            }
            ChannelTarget {
                target,
                property: ch.kind().clone(),
                output_size: ch.curve.value_size(),
            }
        })
        .collect()
}
