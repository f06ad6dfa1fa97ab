//! Interpolation helpers.
//!
//! Buffer-writing variants of linear/step blends and a quaternion NLERP
//! with shortest-arc sign correction. Callers own the output buffers so
//! the per-tick path does not allocate.

pub mod functions;
