//! Keyframe lookup: which pair of keys brackets a time, and how far between them.
//!
//! Model:
//! - current key = last key whose time is strictly below the query (0 if none).
//! - next key = current + 1; past the end it clamps (Once) or wraps to 0 (Loop).
//! - alpha = 0 when both keys coincide, 1 when their gap is below epsilon
//!   (this includes the negative gap of a loop wrap), else the linear ratio.
//!
//! The scan runs backward from the last key: playback usually sits near the
//! end of what was looked up last frame.

use crate::data::KeyframeCurve;
use crate::options::WrapMode;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeySample {
    pub current_key: usize,
    pub next_key: usize,
    pub alpha: f32,
}

impl KeyframeCurve {
    /// Locate the bracketing keys for `time` (seconds). `None` for an empty curve.
    pub fn sample_at(&self, time: f32, wrap_mode: WrapMode, epsilon: f32) -> Option<KeySample> {
        let keys = &self.keys;
        let num_keys = keys.len();
        if num_keys == 0 {
            return None;
        }

        let mut current_key = 0;
        let mut key_time = 0.0;
        for i in (0..num_keys).rev() {
            if time > keys[i].time {
                current_key = i;
                key_time = time - keys[i].time;
                break;
            }
        }

        let mut next_key = current_key + 1;
        if next_key >= num_keys {
            next_key = match wrap_mode {
                WrapMode::Once => num_keys - 1,
                WrapMode::Loop => 0,
            };
        }

        let alpha = if next_key == current_key {
            0.0
        } else {
            let gap = keys[next_key].time - keys[current_key].time;
            if gap < epsilon {
                1.0
            } else {
                key_time / gap
            }
        };

        Some(KeySample {
            current_key,
            next_key,
            alpha,
        })
    }
}
