//! Interpolation helpers:
//! - lerp_f32 / lerp_into (component-wise)
//! - step_into (hold left)
//! - nlerp_quat / nlerp_quat_into (shortest-arc, normalized)
//!
//! Buffers are written up to the shortest of the inputs.

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise lerp of `a` and `b` into `out`.
#[inline]
pub fn lerp_into(out: &mut [f32], a: &[f32], b: &[f32], t: f32) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = lerp_f32(*x, *y, t);
    }
}

/// Step interpolation: copy the left value.
#[inline]
pub fn step_into(out: &mut [f32], a: &[f32]) {
    for (o, x) in out.iter_mut().zip(a) {
        *o = *x;
    }
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion (x, y, z, w). Degenerate input maps to identity.
#[inline]
pub fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
        q
    } else {
        [0.0, 0.0, 0.0, 1.0]
    }
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4([
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ])
}

#[inline]
fn quat_from(s: &[f32]) -> Option<[f32; 4]> {
    match s {
        [x, y, z, w, ..] => Some([*x, *y, *z, *w]),
        _ => None,
    }
}

/// NLERP two quaternion slices into `out`. Falls back to a plain lerp when
/// either side is not a quaternion.
pub fn nlerp_quat_into(out: &mut [f32], a: &[f32], b: &[f32], t: f32) {
    match (quat_from(a), quat_from(b)) {
        (Some(qa), Some(qb)) if out.len() >= 4 => {
            out[..4].copy_from_slice(&nlerp_quat(qa, qb, t));
        }
        _ => lerp_into(out, a, b, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn lerp_into_writes_every_component() {
        let mut out = [0.0; 3];
        lerp_into(&mut out, &[0.0, 10.0, -2.0], &[10.0, 20.0, 2.0], 0.25);
        assert_eq!(out, [2.5, 12.5, -1.0]);
    }

    #[test]
    fn nlerp_takes_shortest_arc() {
        // q and -q are the same rotation; halfway must stay on it.
        let q = [0.0, 0.0, 0.0, 1.0];
        let neg = [0.0, 0.0, 0.0, -1.0];
        let mid = nlerp_quat(q, neg, 0.5);
        approx(mid[3], 1.0);
    }

    #[test]
    fn nlerp_into_is_normalized() {
        let mut out = [0.0; 4];
        let s = std::f32::consts::FRAC_1_SQRT_2;
        nlerp_quat_into(&mut out, &[0.0, 0.0, 0.0, 1.0], &[0.0, s, 0.0, s], 0.5);
        let len = dot4(out, out).sqrt();
        approx(len, 1.0);
    }
}
