//! LayerPool: owning store for layers, addressed by generational `LayerId`s.
//!
//! Operations that touch two layers (mix, weight reads through a mix pair,
//! handing channels back when a mix layer stops) go through the pool so the
//! partner is looked up by handle. A removed partner leaves a stale handle;
//! reads through it degrade to the layer's own weight.

use std::sync::Arc;

use crate::binding::ChannelTarget;
use crate::blend::ChannelBlender;
use crate::config::Config;
use crate::data::AnimationClip;
use crate::ids::{IdAllocator, LayerId};
use crate::layer::{AnimationLayer, LayerTick};
use crate::options::PlayOptions;
use crate::scene::{EntityId, SceneLookup};

#[derive(Debug)]
struct Slot {
    id: LayerId,
    layer: AnimationLayer,
}

#[derive(Debug)]
pub struct LayerPool {
    cfg: Config,
    ids: IdAllocator,
    slots: Vec<Option<Slot>>,
}

impl Default for LayerPool {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl LayerPool {
    pub fn new(cfg: Config) -> Self {
        Self {
            ids: IdAllocator::with_capacity(cfg.layer_capacity),
            slots: Vec::with_capacity(cfg.layer_capacity),
            cfg,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn create_layer(&mut self) -> LayerId {
        let id = self.ids.alloc();
        let idx = id.index as usize;
        if self.slots.len() <= idx {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(Slot {
            id,
            layer: AnimationLayer::with_config(&self.cfg),
        });
        id
    }

    /// Drop a layer. Its handle, and any partner's handle to it, go stale.
    /// A playing mix layer hands its channels back first.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<AnimationLayer> {
        self.release_if_mixing(id);
        if !self.ids.release(id) {
            return None;
        }
        self.slots
            .get_mut(id.index as usize)
            .and_then(Option::take)
            .map(|s| s.layer)
    }

    /// Remove every layer that is no longer playing. Returns how many went.
    pub fn remove_idle_layers(&mut self) -> usize {
        let idle: Vec<LayerId> = self.iter().filter(|(_, l)| !l.is_playing()).map(|(id, _)| id).collect();
        for id in &idle {
            self.remove_layer(*id);
        }
        idle.len()
    }

    #[inline]
    pub fn contains(&self, id: LayerId) -> bool {
        self.ids.is_live(id)
    }

    pub fn get(&self, id: LayerId) -> Option<&AnimationLayer> {
        if !self.ids.is_live(id) {
            return None;
        }
        self.slots
            .get(id.index as usize)?
            .as_ref()
            .map(|s| &s.layer)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut AnimationLayer> {
        if !self.ids.is_live(id) {
            return None;
        }
        self.slots
            .get_mut(id.index as usize)?
            .as_mut()
            .map(|s| &mut s.layer)
    }

    /// Borrow two distinct live layers mutably.
    pub fn get_pair_mut(
        &mut self,
        a: LayerId,
        b: LayerId,
    ) -> Option<(&mut AnimationLayer, &mut AnimationLayer)> {
        if a.index == b.index || !self.ids.is_live(a) || !self.ids.is_live(b) {
            return None;
        }
        let (ia, ib) = (a.index as usize, b.index as usize);
        let (lo, hi) = (ia.min(ib), ia.max(ib));
        let (head, tail) = self.slots.split_at_mut(hi);
        let lo_layer = &mut head.get_mut(lo)?.as_mut()?.layer;
        let hi_layer = &mut tail.get_mut(0)?.as_mut()?.layer;
        if ia < ib {
            Some((lo_layer, hi_layer))
        } else {
            Some((hi_layer, lo_layer))
        }
    }

    /// Live layers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &AnimationLayer)> {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().map(|s| (s.id, &s.layer)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- playback ----------------------------------------------------------

    pub fn play(
        &mut self,
        id: LayerId,
        clip: Option<Arc<AnimationClip>>,
        scene: &dyn SceneLookup,
        root: EntityId,
        options: &PlayOptions,
    ) -> Option<Vec<ChannelTarget>> {
        self.release_if_mixing(id);
        self.get_mut(id)?.play(clip, scene, root, options)
    }

    pub fn can_mix(&self, target: LayerId, next_clip: &AnimationClip, scene: &dyn SceneLookup, root: EntityId) -> bool {
        self.get(target)
            .is_some_and(|layer| layer.can_mix(next_clip, scene, root))
    }

    /// Mix `clip` on `mix_layer` over `target`. False when either handle is
    /// stale, both are the same layer, or the target is not playing.
    /// A layer that is already mixing releases its previous claims first.
    pub fn mix(
        &mut self,
        mix_layer: LayerId,
        clip: Arc<AnimationClip>,
        target: LayerId,
        scene: &dyn SceneLookup,
        mix_entity: EntityId,
        options: &PlayOptions,
    ) -> bool {
        if self.get_pair_mut(mix_layer, target).is_some() {
            self.release_if_mixing(mix_layer);
        }
        match self.get_pair_mut(mix_layer, target) {
            Some((layer, target_layer)) => layer.mix(clip, target_layer, target, scene, mix_entity, options),
            None => {
                log::warn!("mix {mix_layer:?} over {target:?}: layer handle is stale or shared");
                false
            }
        }
    }

    /// Stop a layer. A mix layer cut immediately hands its channels back.
    pub fn stop(&mut self, id: LayerId, immediate: bool) {
        let Some(layer) = self.get_mut(id) else {
            return;
        };
        let was_playing = layer.is_playing();
        layer.stop(immediate);
        if was_playing && !layer.is_playing() && layer.is_mix_layer() {
            self.release_mix_claims(id);
        }
    }

    /// Start `clip` on a fresh layer that ramps in over `duration` ticks while
    /// `from` (if playing) ramps out over the same span.
    pub fn cross_fade(
        &mut self,
        from: LayerId,
        clip: Arc<AnimationClip>,
        scene: &dyn SceneLookup,
        root: EntityId,
        duration: f32,
        options: &PlayOptions,
    ) -> Option<(LayerId, Vec<ChannelTarget>)> {
        let to = self.create_layer();
        let targets = match self.play(to, Some(clip), scene, root, options) {
            Some(t) => t,
            None => {
                self.remove_layer(to);
                return None;
            }
        };
        if let Some(layer) = self.get_mut(to) {
            layer.cross_fade_in(duration);
        }
        if let Some(outgoing) = self.get_mut(from) {
            if outgoing.is_playing() {
                outgoing.fade_out(duration);
            }
        }
        Some((to, targets))
    }

    // ---- per tick ----------------------------------------------------------

    pub fn update_state(&mut self, id: LayerId, delta: f32) -> LayerTick {
        let tick = match self.get_mut(id) {
            Some(layer) => layer.update_state(delta),
            None => return LayerTick::default(),
        };
        if tick.released_mix {
            self.release_mix_claims(id);
        }
        tick
    }

    /// Tick every live layer in slot order.
    pub fn update_all(&mut self, delta: f32) {
        for idx in 0..self.slots.len() {
            let Some(slot) = self.slots[idx].as_mut() else {
                continue;
            };
            let id = slot.id;
            if slot.layer.update_state(delta).released_mix {
                self.release_mix_claims(id);
            }
        }
    }

    /// Revert every channel `mix_layer` claimed to its mix target.
    pub fn release_mix_claims(&mut self, mix_layer: LayerId) {
        let Some(target) = self.get(mix_layer).and_then(|l| l.mix_target_layer()) else {
            return;
        };
        match self.get_pair_mut(mix_layer, target) {
            Some((layer, target_layer)) => layer.remove_mix_weight(target_layer),
            None => log::error!("mix target {target:?} of {mix_layer:?} is gone; nothing to hand back"),
        }
    }

    fn release_if_mixing(&mut self, id: LayerId) {
        if self.get(id).is_some_and(|l| l.is_mix_layer() && l.is_playing()) {
            self.release_mix_claims(id);
        }
    }

    /// Effective weight of one channel, resolving the mix partner by handle.
    pub fn channel_layer_weight(&self, id: LayerId, channel: usize) -> Option<f32> {
        let layer = self.get(id)?;
        let partner = layer.mix_target_layer().and_then(|t| self.get(t));
        if layer.is_mix_layer() && partner.is_none() {
            log::warn!("{id:?}: mix target is gone; using own layer weight");
        }
        Some(layer.channel_layer_weight(channel, partner))
    }

    /// Deliver queued events on every layer. Returns the total delivered.
    pub fn trigger_all_events(&mut self) -> usize {
        self.slots
            .iter_mut()
            .flatten()
            .map(|s| s.layer.trigger_events())
            .sum()
    }

    /// Add one layer's weighted channel values to `blender`.
    pub fn accumulate(&self, id: LayerId, targets: &[ChannelTarget], blender: &mut ChannelBlender) {
        let Some(layer) = self.get(id) else {
            return;
        };
        let partner = layer.mix_target_layer().and_then(|t| self.get(t));
        blender.add_layer(layer, targets, partner);
    }
}
