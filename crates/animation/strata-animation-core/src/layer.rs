//! AnimationLayer: one live playback slot advancing a clip's channels.
//!
//! Phases: Idle -> Playing (`play`) -> CrossFading (`cross_fade_in`) or
//! Fading (`fade_out`) -> Idle (every channel finished, fade reached zero,
//! or `stop(true)`).
//!
//! Per tick (`update_state`):
//! 1. fade / cross-fade weight advances in ticks;
//! 2. the delta is converted to clip seconds;
//! 3. due events with a listener are queued (delivered later by
//!    `trigger_events`);
//! 4. each channel advances and is resampled;
//! 5. with no channel left playing the layer stops, and a stopped mix layer
//!    asks its owner to hand its channels back to the mix target.
//!
//! Mixing pairs two layers channel by channel: after `mix`, each channel is
//! owned (weight 1) by exactly one of them. The back-reference to the
//! partner is a `LayerId`, never an owning pointer.

use std::rc::Rc;
use std::sync::Arc;

use crate::binding::{find_channel_target, resolve_clip_targets, ChannelTarget};
use crate::channel::ChannelState;
use crate::config::Config;
use crate::data::AnimationClip;
use crate::events::{AnimationEventType, EventDispatcher, EventKey, FrameEvent, LayerEvent};
use crate::ids::LayerId;
use crate::options::{PlayOptions, WrapMode};
use crate::scene::{EntityId, SceneLookup};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayerPhase {
    Idle,
    Playing,
    CrossFading,
    Fading,
}

/// What one `update_state` call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerTick {
    /// Channels that reported "still playing".
    pub playing_channels: usize,
    /// The layer went from playing to stopped during this tick.
    pub stopped: bool,
    /// A mix layer stopped; its claimed channels must revert to the mix target.
    pub released_mix: bool,
}

#[derive(Debug)]
pub struct AnimationLayer {
    cfg: Config,
    anim_clip: Option<Arc<AnimationClip>>,
    is_playing: bool,
    wrap_mode: WrapMode,
    layer_weight: f32,
    channel_states: Vec<ChannelState>,
    anim_clip_length: f32,

    is_fading: bool,
    fade_delta_time: f32,
    fade_duration: f32,
    cross_fade_delta_time: f32,
    cross_fade_duration: Option<f32>,

    is_mix_layer: bool,
    has_mix_layer: bool,
    mix_target_layer: Option<LayerId>,

    frame_events: Vec<FrameEvent>,
    finished_queued: bool,
    events: EventDispatcher,
}

impl Default for AnimationLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationLayer {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            anim_clip: None,
            is_playing: false,
            wrap_mode: cfg.default_wrap_mode,
            layer_weight: 1.0,
            channel_states: Vec::new(),
            anim_clip_length: 0.0,
            is_fading: false,
            fade_delta_time: 0.0,
            fade_duration: 0.0,
            cross_fade_delta_time: 0.0,
            cross_fade_duration: None,
            is_mix_layer: false,
            has_mix_layer: false,
            mix_target_layer: None,
            frame_events: Vec::new(),
            finished_queued: false,
            events: EventDispatcher::with_capacity(cfg.event_queue_capacity),
        }
    }

    // ---- accessors ---------------------------------------------------------

    /// Playing requires a clip.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.anim_clip.is_some() && self.is_playing
    }

    pub fn phase(&self) -> LayerPhase {
        if !self.is_playing() {
            LayerPhase::Idle
        } else if self.is_fading {
            LayerPhase::Fading
        } else if self.cross_fade_duration.is_some() {
            LayerPhase::CrossFading
        } else {
            LayerPhase::Playing
        }
    }

    #[inline]
    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        self.anim_clip.as_ref()
    }

    #[inline]
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    #[inline]
    pub fn layer_weight(&self) -> f32 {
        self.layer_weight
    }

    #[inline]
    pub fn set_layer_weight(&mut self, weight: f32) {
        self.layer_weight = weight.clamp(0.0, 1.0);
    }

    /// Longest channel curve of the current clip, in seconds.
    #[inline]
    pub fn anim_clip_length(&self) -> f32 {
        self.anim_clip_length
    }

    #[inline]
    pub fn channel_states(&self) -> &[ChannelState] {
        &self.channel_states
    }

    #[inline]
    pub fn channel_state(&self, channel: usize) -> Option<&ChannelState> {
        self.channel_states.get(channel)
    }

    #[inline]
    pub fn is_fading(&self) -> bool {
        self.is_fading
    }

    #[inline]
    pub fn is_cross_fading(&self) -> bool {
        self.cross_fade_duration.is_some()
    }

    #[inline]
    pub fn is_mix_layer(&self) -> bool {
        self.is_mix_layer
    }

    #[inline]
    pub fn has_mix_layer(&self) -> bool {
        self.has_mix_layer
    }

    #[inline]
    pub fn mix_target_layer(&self) -> Option<LayerId> {
        self.mix_target_layer
    }

    #[inline]
    pub fn frame_events(&self) -> &[FrameEvent] {
        &self.frame_events
    }

    /// Events detected but not yet delivered.
    #[inline]
    pub fn queued_events(&self) -> &[LayerEvent] {
        self.events.queued()
    }

    // ---- playback control --------------------------------------------------

    /// Start playing `clip` from time zero. Every channel target is resolved
    /// under `root`; misses are logged and play on untargeted.
    /// Returns the resolved targets, or `None` when no clip was given.
    pub fn play(
        &mut self,
        clip: Option<Arc<AnimationClip>>,
        scene: &dyn SceneLookup,
        root: EntityId,
        options: &PlayOptions,
    ) -> Option<Vec<ChannelTarget>> {
        self.is_playing = clip.is_some();
        self.anim_clip = clip;
        self.wrap_mode = options.wrap_mode.unwrap_or(self.cfg.default_wrap_mode);
        self.reset_runtime(options);

        let clip = self.anim_clip.clone()?;
        let targets = resolve_clip_targets(&clip, scene, root);
        self.channel_states.extend(
            (0..clip.channel_count()).map(|i| ChannelState::new(clip.create_channel_value(i))),
        );
        self.anim_clip_length = longest_curve(&clip);
        log::debug!(
            "layer play '{}' ({} channels, {:?}, length {}s)",
            clip.name(),
            clip.channel_count(),
            self.wrap_mode,
            self.anim_clip_length
        );
        Some(targets)
    }

    /// Whether `next_clip` can be mixed on top of this layer: it must be
    /// playing, not fading, not itself a mix layer, and both clips must
    /// drive the same targets channel for channel.
    pub fn can_mix(&self, next_clip: &AnimationClip, scene: &dyn SceneLookup, root: EntityId) -> bool {
        let Some(current) = self.anim_clip.as_deref() else {
            return false;
        };
        if !self.is_playing || self.is_mix_layer || self.is_fading {
            return false;
        }
        if current.channel_count() != next_clip.channel_count() {
            return false;
        }
        current
            .channels()
            .iter()
            .zip(next_clip.channels())
            .all(|(cur, next)| {
                find_channel_target(scene, root, &cur.relative_path, cur.kind())
                    == find_channel_target(scene, root, &next.relative_path, next.kind())
            })
    }

    /// Mix `clip` over `target`: this layer claims every channel whose node
    /// exists under `mix_entity`, the target yields exactly those.
    /// `can_mix` is the caller's precondition and is not re-checked here.
    pub fn mix(
        &mut self,
        clip: Arc<AnimationClip>,
        target: &mut AnimationLayer,
        target_id: LayerId,
        scene: &dyn SceneLookup,
        mix_entity: EntityId,
        options: &PlayOptions,
    ) -> bool {
        self.is_playing = target.is_playing();
        self.anim_clip = Some(clip.clone());
        self.wrap_mode = options.wrap_mode.unwrap_or(target.wrap_mode);
        self.reset_runtime(options);

        if !self.is_playing {
            return false;
        }

        for (i, ch) in clip.channels().iter().enumerate() {
            let claimed = find_channel_target(scene, mix_entity, &ch.relative_path, ch.kind()).is_some();
            let mut state = ChannelState::new(clip.create_channel_value(i));
            state.mix_weight = Some(if claimed { 1.0 } else { 0.0 });
            self.channel_states.push(state);

            if let Some(target_state) = target.channel_states.get_mut(i) {
                let weight = target_state.mix_weight.get_or_insert(1.0);
                if *weight == 1.0 && claimed {
                    *weight = 0.0;
                }
            }
        }
        self.anim_clip_length = longest_curve(&clip);

        self.is_mix_layer = true;
        self.mix_target_layer = Some(target_id);
        target.has_mix_layer = true;
        log::debug!(
            "layer mix '{}' over {:?} ({} channels claimed)",
            clip.name(),
            target_id,
            self.channel_states.iter().filter(|s| s.mix_weight == Some(1.0)).count()
        );
        true
    }

    /// Hand every channel this layer owns back to `target`.
    pub fn remove_mix_weight(&self, target: &mut AnimationLayer) {
        for (mine, theirs) in self.channel_states.iter().zip(target.channel_states.iter_mut()) {
            if mine.mix_weight == Some(1.0) {
                theirs.mix_weight = Some(1.0);
            }
        }
    }

    /// `immediate` cuts playback now; otherwise the current cycle completes
    /// and the layer stops at the clip end.
    pub fn stop(&mut self, immediate: bool) {
        if !self.is_playing() {
            return;
        }
        if immediate {
            self.is_playing = false;
        } else {
            self.wrap_mode = WrapMode::Once;
        }
    }

    /// Ramp the layer weight from 1 to 0 over `duration` ticks, then stop.
    pub fn fade_out(&mut self, duration: f32) {
        self.is_fading = true;
        self.fade_delta_time = 0.0;
        self.fade_duration = duration;
    }

    /// Ramp the layer weight from 0 to 1 over `duration` ticks.
    pub fn cross_fade_in(&mut self, duration: f32) {
        self.cross_fade_delta_time = 0.0;
        if duration > 0.0 {
            self.cross_fade_duration = Some(duration);
            self.layer_weight = 0.0;
        } else {
            self.cross_fade_duration = None;
            self.layer_weight = 1.0;
        }
    }

    // ---- per tick ----------------------------------------------------------

    /// Advance by `delta` ticks (milliseconds with the default config).
    pub fn update_state(&mut self, delta: f32) -> LayerTick {
        if !self.is_playing() {
            return LayerTick::default();
        }

        if self.is_fading {
            self.fade_delta_time += delta;
            self.layer_weight = if self.fade_duration > 0.0 {
                1.0 - self.fade_delta_time / self.fade_duration
            } else {
                0.0
            };
            if self.layer_weight <= 0.0 {
                self.layer_weight = 0.0;
                self.is_playing = false;
            }
        } else if let Some(duration) = self.cross_fade_duration {
            self.cross_fade_delta_time += delta;
            self.layer_weight = self.cross_fade_delta_time / duration;
            if self.layer_weight >= 1.0 {
                self.layer_weight = 1.0;
                self.cross_fade_duration = None;
            }
        }

        let dt = self.cfg.ticks_to_seconds(delta);
        self.activate_events(dt);

        let mut playing_channels = 0;
        for i in 0..self.channel_states.len() {
            if self.update_channel_state(dt, i) {
                playing_channels += 1;
            }
        }

        if playing_channels == 0 {
            self.is_playing = false;
        }

        let stopped = !self.is_playing;
        LayerTick {
            playing_channels,
            stopped,
            released_mix: stopped && self.is_mix_layer,
        }
    }

    /// Advance one channel by `delta_seconds` and resample it.
    /// Returns false once a `Once` channel has reached its end.
    pub fn update_channel_state(&mut self, delta_seconds: f32, channel: usize) -> bool {
        let Some(clip) = self.anim_clip.as_deref() else {
            return false;
        };
        let (Some(ch), Some(state)) = (clip.channel(channel), self.channel_states.get_mut(channel)) else {
            return false;
        };
        let channel_length = ch.curve.length();

        state.frame_time += delta_seconds;
        match self.wrap_mode {
            WrapMode::Once => {
                if state.frame_time > channel_length {
                    state.frame_time = channel_length;
                }
            }
            WrapMode::Loop => {
                // Wraps on the layer's longest curve; shorter channels hold
                // their last key until then.
                if self.anim_clip_length <= 0.0 {
                    state.frame_time = 0.0;
                } else if state.frame_time >= self.anim_clip_length {
                    state.frame_time %= self.anim_clip_length;
                }
            }
        }

        let finished = self.wrap_mode == WrapMode::Once && state.frame_time >= channel_length;

        // Owned by the mix partner: the clock runs but nothing is sampled.
        if state.is_yielded() {
            return !finished;
        }

        let sample_time = state.frame_time.min(channel_length);
        if let Some(s) = ch.curve.sample_at(sample_time, self.wrap_mode, self.cfg.key_gap_epsilon) {
            clip.evaluate(&mut state.current_value, channel, s.current_key, s.next_key, s.alpha);
        }

        !finished
    }

    /// Scrub every channel to `frame_time` seconds. No events are queued.
    pub fn jump_to_frame(&mut self, frame_time: f32) {
        for i in 0..self.channel_states.len() {
            self.channel_states[i].frame_time = 0.0;
            self.update_channel_state(frame_time, i);
        }
    }

    // ---- reads -------------------------------------------------------------

    #[inline]
    pub fn channel_value(&self, channel: usize) -> Option<&[f32]> {
        self.channel_states
            .get(channel)
            .map(|s| s.current_value.as_slice())
    }

    /// Effective blend weight of one channel. Inside a mix pair the channel's
    /// authority (0 or 1) scales the layer weight that governs the pair: the
    /// target's weight for a mix layer, this layer's own otherwise.
    /// `mix_target` is the layer behind `mix_target_layer()`, if still alive.
    pub fn channel_layer_weight(&self, channel: usize, mix_target: Option<&AnimationLayer>) -> f32 {
        if (self.has_mix_layer || self.is_mix_layer) && channel < self.channel_states.len() {
            let mix_weight = self.channel_states[channel].effective_mix_weight();
            let layer_weight = if self.is_mix_layer {
                mix_target.map_or(self.layer_weight, |t| t.layer_weight)
            } else {
                self.layer_weight
            };
            return mix_weight * layer_weight;
        }
        self.layer_weight
    }

    // ---- events ------------------------------------------------------------

    pub fn add_event_listener(&mut self, key: EventKey, callback: impl FnMut(&LayerEvent) + 'static) {
        self.events.add_listener(key, Box::new(callback));
    }

    pub fn remove_all_event_listeners(&mut self) {
        self.events.remove_all();
    }

    /// Deliver queued events to listeners. Returns how many were delivered.
    pub fn trigger_events(&mut self) -> usize {
        self.events.dispatch_queued()
    }

    fn activate_events(&mut self, delta_seconds: f32) {
        let Some(clip) = self.anim_clip.as_deref() else {
            return;
        };
        let Some(tracked) = self.channel_states.get(clip.duration_index()) else {
            return;
        };
        let cur_frame_time = tracked.frame_time + delta_seconds;

        for fe in self.frame_events.iter_mut() {
            if !fe.triggered && cur_frame_time > fe.trigger_time {
                fe.triggered = true;
                if self.events.has_listener(fe.key) {
                    self.events.queue(LayerEvent {
                        key: fe.key,
                        frame_time: cur_frame_time,
                    });
                }
            }
        }

        if cur_frame_time >= clip.duration() {
            match self.wrap_mode {
                WrapMode::Loop => {
                    for fe in self.frame_events.iter_mut() {
                        fe.triggered = false;
                    }
                    if self.events.has_listener(EventKey::LoopEnd) {
                        self.events.queue(LayerEvent {
                            key: EventKey::LoopEnd,
                            frame_time: cur_frame_time,
                        });
                    }
                }
                WrapMode::Once => {
                    if !self.finished_queued && self.events.has_listener(EventKey::Finished) {
                        self.finished_queued = true;
                        self.events.queue(LayerEvent {
                            key: EventKey::Finished,
                            frame_time: cur_frame_time,
                        });
                    }
                }
            }
        }
    }

    /// Clear everything a new `play`/`mix` replaces. Listeners go too; the
    /// callbacks authored in `options` are registered afresh.
    fn reset_runtime(&mut self, options: &PlayOptions) {
        self.channel_states.clear();
        self.anim_clip_length = 0.0;
        self.layer_weight = 1.0;
        self.is_fading = false;
        self.fade_delta_time = 0.0;
        self.fade_duration = 0.0;
        self.cross_fade_delta_time = 0.0;
        self.cross_fade_duration = None;
        self.is_mix_layer = false;
        self.has_mix_layer = false;
        self.mix_target_layer = None;

        self.events.remove_all();
        self.events.clear_queue();
        self.finished_queued = false;
        self.frame_events.clear();
        for spec in &options.events {
            let key = match spec.kind {
                AnimationEventType::FrameEvent => {
                    let key = EventKey::Frame(self.frame_events.len());
                    self.frame_events.push(FrameEvent {
                        key,
                        trigger_time: spec.trigger_time,
                        triggered: false,
                    });
                    key
                }
                AnimationEventType::LoopEnd => EventKey::LoopEnd,
                AnimationEventType::Finished => EventKey::Finished,
            };
            if let Some(callback) = &spec.callback {
                let callback = Rc::clone(callback);
                self.events
                    .add_listener(key, Box::new(move |e: &LayerEvent| (&mut *callback.borrow_mut())(e)));
            }
        }
    }
}

fn longest_curve(clip: &AnimationClip) -> f32 {
    clip.channels()
        .iter()
        .map(|c| c.curve.length())
        .fold(0.0, f32::max)
}
