use serde::Deserialize;

use crate::data::{AnimationClip, ClipChannel, Interpolation, Keyframe, KeyframeCurve};
use crate::error::ClipError;

/// Public API: parse clip JSON into a validated `AnimationClip`.
///
/// Shape:
/// `{ "name": .., "channels": [ { "target": "arm", "property": "rotation",
///    "interpolation"?: "linear" | "step", "length"?: seconds,
///    "keys": [ { "time": 0.0, "value": [..] }, .. ] } ] }`
///
/// Notes:
/// - Times are seconds.
/// - `length` defaults to the last key time and may extend past it. Past
///   the last key a `Once` channel holds its last value; a `Loop` channel
///   samples toward the wrapped first key with alpha 1, i.e. the first key.
pub fn parse_clip_json(s: &str) -> Result<AnimationClip, ClipError> {
    let raw: RawClip = serde_json::from_str(s)?;
    let channels = raw
        .channels
        .into_iter()
        .map(|rc| {
            let curve = match rc.length {
                Some(length) => KeyframeCurve::with_length(rc.keys, length),
                None => KeyframeCurve::new(rc.keys),
            };
            ClipChannel::new(rc.target, rc.property, curve.with_interpolation(rc.interpolation))
        })
        .collect();
    AnimationClip::new(raw.name, channels)
}

impl AnimationClip {
    pub fn from_json(s: &str) -> Result<Self, ClipError> {
        parse_clip_json(s)
    }
}

#[derive(Debug, Deserialize)]
struct RawClip {
    name: String,
    channels: Vec<RawChannel>,
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    target: String,
    property: String,
    #[serde(default)]
    interpolation: Interpolation,
    #[serde(default)]
    length: Option<f32>,
    keys: Vec<Keyframe>,
}
