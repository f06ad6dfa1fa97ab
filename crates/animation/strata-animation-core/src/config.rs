//! Core configuration for strata-animation-core.

use serde::{Deserialize, Serialize};

use crate::options::WrapMode;

/// Tuning knobs shared by every layer created from the same pool.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Ticks per second of the `update_state` delta. Fade and cross-fade
    /// durations are expressed in ticks too; channel time is in seconds.
    pub tick_units_per_second: f32,

    /// Key gaps smaller than this sample the next key outright (alpha = 1).
    pub key_gap_epsilon: f32,

    /// Wrap mode used by `play` when the options leave it unset.
    pub default_wrap_mode: WrapMode,

    /// Initial capacity of each layer's activated-event queue.
    pub event_queue_capacity: usize,

    /// Initial slot capacity of a `LayerPool`.
    pub layer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_units_per_second: 1000.0,
            key_gap_epsilon: 1e-5,
            default_wrap_mode: WrapMode::Loop,
            event_queue_capacity: 8,
            layer_capacity: 4,
        }
    }
}

impl Config {
    /// Convert an update delta (ticks) into clip seconds.
    #[inline]
    pub fn ticks_to_seconds(&self, ticks: f32) -> f32 {
        if self.tick_units_per_second > 0.0 {
            ticks / self.tick_units_per_second
        } else {
            ticks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_milliseconds() {
        let cfg = Config::default();
        assert_eq!(cfg.ticks_to_seconds(500.0), 0.5);
        assert_eq!(cfg.default_wrap_mode, WrapMode::Loop);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "key_gap_epsilon": 0.001 }"#).unwrap();
        assert_eq!(cfg.key_gap_epsilon, 0.001);
        assert_eq!(cfg.tick_units_per_second, 1000.0);
    }
}
