//! Strata Animation Core (engine-agnostic)
//!
//! Layered clip playback: keyframe sampling per channel, play/stop/loop/once
//! state per layer, cross-fades, channel-partitioned mixing of two layers,
//! and frame/loop/finish events queued during the tick and delivered on
//! demand. Scene access goes through the `scene` traits; clips arrive
//! already parsed (see `clip_loader` for the JSON form).

pub mod binding;
pub mod blend;
pub mod channel;
pub mod clip_loader;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod ids;
pub mod interp;
pub mod layer;
pub mod options;
pub mod pool;
pub mod sampling;
pub mod scene;

// Re-exports for consumers (adapters)
pub use binding::{find_channel_target, resolve_clip_targets, ChannelTarget};
pub use blend::ChannelBlender;
pub use channel::ChannelState;
pub use clip_loader::parse_clip_json;
pub use config::Config;
pub use data::{AnimationClip, ClipChannel, Interpolation, Keyframe, KeyframeCurve, PropertyKind};
pub use error::ClipError;
pub use events::{AnimationEventType, EventKey, FrameEvent, LayerEvent};
pub use ids::LayerId;
pub use layer::{AnimationLayer, LayerPhase, LayerTick};
pub use options::{EventSpec, PlayOptions, WrapMode};
pub use pool::LayerPool;
pub use sampling::KeySample;
pub use scene::{ChannelSink, EntityId, SceneLookup, SceneTree, TargetRef};
