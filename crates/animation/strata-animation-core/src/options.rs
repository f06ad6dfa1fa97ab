//! Playback options passed to `play` / `mix`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::events::{AnimationEventType, LayerEvent, SharedEventCallback};

/// What a layer does when a channel runs past its curve.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Clamp at the end and finish.
    Once,
    /// Wrap back to the start.
    Loop,
}

/// One authored event attached to a playback. A callback, when present, is
/// registered as a listener for the event each time the options are played.
#[derive(Clone, Serialize, Deserialize)]
pub struct EventSpec {
    pub kind: AnimationEventType,
    /// Seconds into the clip; only meaningful for frame events.
    #[serde(default)]
    pub trigger_time: f32,
    #[serde(skip)]
    pub callback: Option<SharedEventCallback>,
}

impl std::fmt::Debug for EventSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSpec")
            .field("kind", &self.kind)
            .field("trigger_time", &self.trigger_time)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl EventSpec {
    fn of_kind(kind: AnimationEventType, trigger_time: f32) -> Self {
        Self {
            kind,
            trigger_time,
            callback: None,
        }
    }

    pub fn frame(trigger_time: f32) -> Self {
        Self::of_kind(AnimationEventType::FrameEvent, trigger_time)
    }

    pub fn loop_end() -> Self {
        Self::of_kind(AnimationEventType::LoopEnd, 0.0)
    }

    pub fn finished() -> Self {
        Self::of_kind(AnimationEventType::Finished, 0.0)
    }

    pub fn with_callback(mut self, callback: impl FnMut(&LayerEvent) + 'static) -> Self {
        let callback: SharedEventCallback = Rc::new(RefCell::new(callback));
        self.callback = Some(callback);
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayOptions {
    /// `None` falls back to the config default (`play`) or the target layer's mode (`mix`).
    #[serde(default)]
    pub wrap_mode: Option<WrapMode>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

impl PlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_wrap_mode(mut self, mode: WrapMode) -> Self {
        self.wrap_mode = Some(mode);
        self
    }

    #[inline]
    pub fn once() -> Self {
        Self::new().with_wrap_mode(WrapMode::Once)
    }

    #[inline]
    pub fn looped() -> Self {
        Self::new().with_wrap_mode(WrapMode::Loop)
    }

    #[inline]
    pub fn with_event(mut self, event: EventSpec) -> Self {
        self.events.push(event);
        self
    }
}
