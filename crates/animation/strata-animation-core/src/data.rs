//! Clip data model: keyframe curves grouped into channels.
//!
//! Clips are immutable once built and shared as `Arc<AnimationClip>` across
//! every layer playing them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ClipError;
use crate::interp::functions::{lerp_into, nlerp_quat_into, step_into};

/// How values between two keys are produced.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the left key until the next one.
    Step,
}

/// Animated property of a channel, derived from its property name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Position,
    Rotation,
    Scale,
    /// Morph/blend-shape weights, stored on a blend-weight component.
    Weights,
    Other(Arc<str>),
}

impl PropertyKind {
    pub fn from_property_name(name: &str) -> Self {
        match name {
            "position" | "translation" => Self::Position,
            "rotation" => Self::Rotation,
            "scale" => Self::Scale,
            "weights" => Self::Weights,
            other => Self::Other(Arc::from(other)),
        }
    }

    #[inline]
    pub fn is_rotation(&self) -> bool {
        matches!(self, Self::Rotation)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    /// Seconds from clip start.
    pub time: f32,
    pub value: Vec<f32>,
}

/// Ordered keys of one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeCurve {
    pub(crate) keys: Vec<Keyframe>,
    pub(crate) length: f32,
    pub(crate) value_size: usize,
    pub(crate) interpolation: Interpolation,
}

impl KeyframeCurve {
    /// Build a curve whose length is the last key time.
    pub fn new(keys: Vec<Keyframe>) -> Self {
        let length = keys.last().map(|k| k.time).unwrap_or(0.0);
        Self::with_length(keys, length)
    }

    pub fn with_length(keys: Vec<Keyframe>, length: f32) -> Self {
        let value_size = keys.first().map(|k| k.value.len()).unwrap_or(0);
        Self {
            keys,
            length,
            value_size,
            interpolation: Interpolation::Linear,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[inline]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    fn validate(&self, channel: usize, path: &str) -> Result<(), ClipError> {
        if self.keys.is_empty() {
            return Err(ClipError::EmptyCurve {
                channel,
                path: path.to_string(),
            });
        }
        let mut last = f32::NEG_INFINITY;
        for (key, k) in self.keys.iter().enumerate() {
            if !k.time.is_finite() {
                return Err(ClipError::NonFiniteTime { channel, key });
            }
            if k.time < last {
                return Err(ClipError::UnsortedKeys {
                    channel,
                    path: path.to_string(),
                    key,
                });
            }
            if k.value.len() != self.value_size {
                return Err(ClipError::ValueSizeMismatch {
                    channel,
                    key,
                    expected: self.value_size,
                    actual: k.value.len(),
                });
            }
            last = k.time;
        }
        if !self.length.is_finite() || self.length < last {
            return Err(ClipError::InvalidLength {
                channel,
                length: self.length,
                last_key: last,
            });
        }
        Ok(())
    }
}

/// One animated property track.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipChannel {
    /// Node name (or path) relative to the playback root.
    pub relative_path: String,
    pub property_name: String,
    pub curve: KeyframeCurve,
    kind: PropertyKind,
}

impl ClipChannel {
    pub fn new(relative_path: impl Into<String>, property_name: impl Into<String>, curve: KeyframeCurve) -> Self {
        let property_name = property_name.into();
        Self {
            relative_path: relative_path.into(),
            kind: PropertyKind::from_property_name(&property_name),
            property_name,
            curve,
        }
    }

    #[inline]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }
}

/// Authored bundle of channels.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    name: String,
    channels: Vec<ClipChannel>,
    duration: f32,
    duration_index: usize,
}

impl AnimationClip {
    /// Validate channels and cache the duration channel.
    pub fn new(name: impl Into<String>, channels: Vec<ClipChannel>) -> Result<Self, ClipError> {
        let name = name.into();
        if channels.is_empty() {
            return Err(ClipError::EmptyClip { clip: name });
        }
        let mut duration = f32::NEG_INFINITY;
        let mut duration_index = 0;
        for (i, ch) in channels.iter().enumerate() {
            ch.curve.validate(i, &ch.relative_path)?;
            if ch.curve.length > duration {
                duration = ch.curve.length;
                duration_index = i;
            }
        }
        Ok(Self {
            name,
            channels,
            duration,
            duration_index,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn channels(&self) -> &[ClipChannel] {
        &self.channels
    }

    #[inline]
    pub fn channel(&self, index: usize) -> Option<&ClipChannel> {
        self.channels.get(index)
    }

    /// Longest curve length in seconds.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Channel whose clock drives events and loop detection.
    #[inline]
    pub fn duration_index(&self) -> usize {
        self.duration_index
    }

    /// Zeroed value buffer sized for a channel.
    pub fn create_channel_value(&self, index: usize) -> Vec<f32> {
        vec![0.0; self.channels.get(index).map_or(0, |c| c.curve.value_size)]
    }

    /// Interpolate between two keys of a channel into `out` and return it.
    /// Rotation channels are blended as normalized quaternions.
    pub fn evaluate<'a>(
        &self,
        out: &'a mut [f32],
        channel: usize,
        current_key: usize,
        next_key: usize,
        alpha: f32,
    ) -> &'a mut [f32] {
        let Some(ch) = self.channels.get(channel) else {
            return out;
        };
        let keys = &ch.curve.keys;
        let (Some(a), Some(b)) = (keys.get(current_key), keys.get(next_key)) else {
            return out;
        };
        match ch.curve.interpolation {
            Interpolation::Step => step_into(out, &a.value),
            Interpolation::Linear if ch.kind.is_rotation() && a.value.len() == 4 => {
                nlerp_quat_into(out, &a.value, &b.value, alpha)
            }
            Interpolation::Linear => lerp_into(out, &a.value, &b.value, alpha),
        }
        out
    }
}
