//! Accumulation of weighted layer outputs per scene target.
//!
//! Each (target, property) keeps a weighted sum and the total weight; the
//! finished value is `sum / weight`, with rotations renormalized. Entries
//! survive across frames (`begin_frame` only zeroes them) so a steady
//! animation set does not allocate per tick.

use hashbrown::HashMap;

use crate::binding::ChannelTarget;
use crate::data::PropertyKind;
use crate::interp::functions::normalize4;
use crate::layer::AnimationLayer;
use crate::scene::{ChannelSink, TargetRef};

#[derive(Clone, Debug, Default)]
struct BlendEntry {
    sum: Vec<f32>,
    weight: f32,
    out: Vec<f32>,
}

impl BlendEntry {
    fn add(&mut self, value: &[f32], weight: f32, rotation: bool) {
        if self.sum.len() < value.len() {
            self.sum.resize(value.len(), 0.0);
        }
        // Keep rotations in one hemisphere so q and -q do not cancel.
        let sign = if rotation && dot(&self.sum, value) < 0.0 { -1.0 } else { 1.0 };
        for (s, v) in self.sum.iter_mut().zip(value) {
            *s += sign * v * weight;
        }
        self.weight += weight;
    }

    fn finish(&mut self, rotation: bool) {
        self.out.clear();
        if self.weight <= 0.0 {
            return;
        }
        let w = self.weight;
        self.out.extend(self.sum.iter().map(|s| s / w));
        if rotation && self.out.len() == 4 {
            let q = normalize4([self.out[0], self.out[1], self.out[2], self.out[3]]);
            self.out.copy_from_slice(&q);
        }
    }

    fn reset(&mut self) {
        self.sum.fill(0.0);
        self.weight = 0.0;
        self.out.clear();
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Debug, Default)]
pub struct ChannelBlender {
    entries: HashMap<(TargetRef, PropertyKind), BlendEntry>,
}

impl ChannelBlender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every entry, keeping allocations.
    pub fn begin_frame(&mut self) {
        for entry in self.entries.values_mut() {
            entry.reset();
        }
    }

    /// Add `weight * value` for a resolved channel. Untargeted channels and
    /// non-positive weights contribute nothing.
    pub fn add(&mut self, target: &ChannelTarget, value: &[f32], weight: f32) {
        let Some(t) = target.target else {
            return;
        };
        if weight <= 0.0 {
            return;
        }
        let rotation = target.property.is_rotation();
        let key = (t, target.property.clone());
        match self.entries.get_mut(&key) {
            Some(entry) => entry.add(value, weight, rotation),
            None => {
                let mut entry = BlendEntry::default();
                entry.add(value, weight, rotation);
                self.entries.insert(key, entry);
            }
        }
    }

    /// Add every channel of `layer` at its effective channel weight.
    /// `targets` are the ones `play` returned for the layer (or its mix target).
    pub fn add_layer(&mut self, layer: &AnimationLayer, targets: &[ChannelTarget], mix_target: Option<&AnimationLayer>) {
        for (i, target) in targets.iter().enumerate() {
            if let Some(value) = layer.channel_value(i) {
                let weight = layer.channel_layer_weight(i, mix_target);
                self.add(target, value, weight);
            }
        }
    }

    /// Normalize accumulated sums into final values.
    pub fn finish(&mut self) {
        for ((_, property), entry) in self.entries.iter_mut() {
            entry.finish(property.is_rotation());
        }
    }

    /// Finished value for a target property; `None` if nothing contributed.
    pub fn value(&self, target: TargetRef, property: &PropertyKind) -> Option<&[f32]> {
        self.entries
            .get(&(target, property.clone()))
            .filter(|e| !e.out.is_empty())
            .map(|e| e.out.as_slice())
    }

    /// Finish and write every contributed value to `sink`.
    pub fn apply(&mut self, sink: &mut dyn ChannelSink) {
        self.finish();
        for ((target, property), entry) in self.entries.iter() {
            if !entry.out.is_empty() {
                sink.write_channel(*target, property, &entry.out);
            }
        }
    }
}
