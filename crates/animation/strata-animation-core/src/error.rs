//! Error types for clip construction and loading.
//!
//! Playback itself never fails: unresolved targets and misuse are logged
//! and degrade to zero-weight channels. Only building a clip from authored
//! data can be rejected.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClipError {
    /// Clip has no channels at all.
    #[error("clip '{clip}' has no channels")]
    EmptyClip { clip: String },

    /// A channel curve has no keyframes.
    #[error("channel {channel} ('{path}') has no keyframes")]
    EmptyCurve { channel: usize, path: String },

    /// Key times must be non-decreasing.
    #[error("channel {channel} ('{path}') has keys out of order at index {key}")]
    UnsortedKeys {
        channel: usize,
        path: String,
        key: usize,
    },

    /// Every key value must carry exactly `value_size` components.
    #[error("channel {channel} key {key}: expected {expected} components, got {actual}")]
    ValueSizeMismatch {
        channel: usize,
        key: usize,
        expected: usize,
        actual: usize,
    },

    /// Curve length must cover the last key.
    #[error("channel {channel}: length {length} is shorter than last key time {last_key}")]
    InvalidLength {
        channel: usize,
        length: f32,
        last_key: f32,
    },

    /// Key times and lengths must be finite.
    #[error("channel {channel} key {key}: time is not finite")]
    NonFiniteTime { channel: usize, key: usize },

    /// Malformed clip JSON.
    #[error("clip parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ClipError {
    /// Channel index the error refers to, when there is one.
    pub fn channel(&self) -> Option<usize> {
        match self {
            Self::EmptyCurve { channel, .. }
            | Self::UnsortedKeys { channel, .. }
            | Self::ValueSizeMismatch { channel, .. }
            | Self::InvalidLength { channel, .. }
            | Self::NonFiniteTime { channel, .. } => Some(*channel),
            Self::EmptyClip { .. } | Self::Parse(_) => None,
        }
    }
}
