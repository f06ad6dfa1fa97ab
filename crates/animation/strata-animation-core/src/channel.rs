//! Per-layer, per-channel runtime state.

/// Sample clock and last interpolated value of one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelState {
    /// Elapsed sample time in seconds, wrapped or clamped per wrap mode.
    pub frame_time: f32,
    pub current_value: Vec<f32>,
    /// Mix authority: `Some(1.0)` owns the channel, `Some(0.0)` yields it to
    /// the mix partner, `None` means no mix has touched it yet.
    pub mix_weight: Option<f32>,
}

impl ChannelState {
    pub fn new(current_value: Vec<f32>) -> Self {
        Self {
            frame_time: 0.0,
            current_value,
            mix_weight: None,
        }
    }

    #[inline]
    pub fn is_yielded(&self) -> bool {
        self.mix_weight == Some(0.0)
    }

    /// Mix weight with "undecided" read as full authority.
    #[inline]
    pub fn effective_mix_weight(&self) -> f32 {
        self.mix_weight.unwrap_or(1.0)
    }
}
