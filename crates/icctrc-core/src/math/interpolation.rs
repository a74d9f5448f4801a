//! Interpolation functions for LUT evaluation
//!
//! This module provides:
//! - Linear interpolation (1D)
//! - Trilinear interpolation (3D LUT)

/// Linear interpolation between two values
///
/// Returns a + t * (b - a) for t in [0, 1]
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Bilinear interpolation in a 2D grid
///
/// # Arguments
/// * `c00`, `c10`, `c01`, `c11` - Corner values (cXY where X=column, Y=row)
/// * `tx`, `ty` - Interpolation parameters in [0, 1]
#[inline]
pub fn bilinear(c00: f64, c10: f64, c01: f64, c11: f64, tx: f64, ty: f64) -> f64 {
    let top = lerp(c00, c10, tx);
    let bottom = lerp(c01, c11, tx);
    lerp(top, bottom, ty)
}

/// Trilinear interpolation in a 3D grid
///
/// # Arguments
/// * `c` - Array of 8 corner values in order: [000, 100, 010, 110, 001, 101, 011, 111]
///         where the indices represent (x, y, z) positions
/// * `tx`, `ty`, `tz` - Interpolation parameters in [0, 1]
#[inline]
pub fn trilinear(c: [f64; 8], tx: f64, ty: f64, tz: f64) -> f64 {
    // Interpolate along x
    let c00 = lerp(c[0], c[1], tx);
    let c10 = lerp(c[2], c[3], tx);
    let c01 = lerp(c[4], c[5], tx);
    let c11 = lerp(c[6], c[7], tx);

    // Interpolate along y
    let c0 = lerp(c00, c10, ty);
    let c1 = lerp(c01, c11, ty);

    // Interpolate along z
    lerp(c0, c1, tz)
}

/// Trilinear interpolation over a 3D CLUT whose axes may have different
/// grid-point counts (an mAB `clut` need not be a cube, e.g. `17x17x17`
/// alongside arbitrary `dims`). `lut` is flattened in `(i0, i1, i2,
/// channel)` order with `i0` changing least rapidly, matching ICC.1:2022's
/// storage order for `lutAToBType` CLUTs. Input is clamped to `[0, 1]`
/// before indexing: unlike a 1D TRC curve, a CLUT has no defined slope past
/// its sampled edge.
pub fn trilinear_interp_dims(
    lut: &[f64],
    dims: [usize; 3],
    channels: usize,
    input: [f64; 3],
) -> Vec<f64> {
    let max_idx = [
        (dims[0].max(1) - 1) as f64,
        (dims[1].max(1) - 1) as f64,
        (dims[2].max(1) - 1) as f64,
    ];

    let pos: Vec<f64> = (0..3)
        .map(|i| input[i].clamp(0.0, 1.0) * max_idx[i])
        .collect();

    let i0 = [
        pos[0].floor() as usize,
        pos[1].floor() as usize,
        pos[2].floor() as usize,
    ];
    let i1 = [
        (i0[0] + 1).min(dims[0].saturating_sub(1)),
        (i0[1] + 1).min(dims[1].saturating_sub(1)),
        (i0[2] + 1).min(dims[2].saturating_sub(1)),
    ];
    let frac = [pos[0] - i0[0] as f64, pos[1] - i0[1] as f64, pos[2] - i0[2] as f64];

    let idx = |a: usize, b: usize, c: usize, ch: usize| -> f64 {
        let i = ((a * dims[1] + b) * dims[2] + c) * channels + ch;
        lut.get(i).copied().unwrap_or(0.0)
    };

    let mut out = vec![0.0; channels];
    for ch in 0..channels {
        let corners = [
            idx(i0[0], i0[1], i0[2], ch),
            idx(i1[0], i0[1], i0[2], ch),
            idx(i0[0], i1[1], i0[2], ch),
            idx(i1[0], i1[1], i0[2], ch),
            idx(i0[0], i0[1], i1[2], ch),
            idx(i1[0], i0[1], i1[2], ch),
            idx(i0[0], i1[1], i1[2], ch),
            idx(i1[0], i1[1], i1[2], ch),
        ];
        out[ch] = trilinear(corners, frac[0], frac[1], frac[2]);
    }
    out
}

/// Lookup in a 1D LUT with linear interpolation.
///
/// `input` outside `[0, 1]` is extrapolated linearly using the slope of the
/// table's first (below 0) or last (above 1) segment, rather than clamped.
/// This is what lets sampled TRC tables carry HDR values past the domain
/// they were sampled over.
///
/// # Arguments
/// * `lut` - 1D LUT values
/// * `input` - Input value, nominally in `[0, 1]`
///
/// # Returns
/// Interpolated (or extrapolated) output value
pub fn lut1d_interp(lut: &[f64], input: f64) -> f64 {
    if lut.is_empty() {
        return input;
    }
    if lut.len() == 1 {
        return lut[0];
    }

    let max_idx = (lut.len() - 1) as f64;
    let pos = input * max_idx;

    if pos < 0.0 {
        let slope = lut[1] - lut[0];
        return lut[0] + slope * pos;
    }
    if pos > max_idx {
        let slope = lut[lut.len() - 1] - lut[lut.len() - 2];
        return lut[lut.len() - 1] + slope * (pos - max_idx);
    }

    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(lut.len() - 1);
    let t = pos - i0 as f64;

    lerp(lut[i0], lut[i1], t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 1.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((lerp(0.0, 1.0, 1.0) - 1.0).abs() < EPSILON);
        assert!((lerp(0.0, 1.0, 0.5) - 0.5).abs() < EPSILON);
        assert!((lerp(2.0, 4.0, 0.25) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_bilinear() {
        // Identity at corners
        assert!((bilinear(0.0, 1.0, 2.0, 3.0, 0.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((bilinear(0.0, 1.0, 2.0, 3.0, 1.0, 0.0) - 1.0).abs() < EPSILON);
        assert!((bilinear(0.0, 1.0, 2.0, 3.0, 0.0, 1.0) - 2.0).abs() < EPSILON);
        assert!((bilinear(0.0, 1.0, 2.0, 3.0, 1.0, 1.0) - 3.0).abs() < EPSILON);

        // Center should be average
        let center = bilinear(0.0, 1.0, 2.0, 3.0, 0.5, 0.5);
        assert!((center - 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_trilinear_corners() {
        let corners = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

        assert!((trilinear(corners, 0.0, 0.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((trilinear(corners, 1.0, 0.0, 0.0) - 1.0).abs() < EPSILON);
        assert!((trilinear(corners, 0.0, 1.0, 0.0) - 2.0).abs() < EPSILON);
        assert!((trilinear(corners, 1.0, 1.0, 0.0) - 3.0).abs() < EPSILON);
        assert!((trilinear(corners, 0.0, 0.0, 1.0) - 4.0).abs() < EPSILON);
        assert!((trilinear(corners, 1.0, 1.0, 1.0) - 7.0).abs() < EPSILON);
    }

    #[test]
    fn test_identity_lut() {
        // Build an identity 3x3x3 LUT
        let grid_size = 3;
        let dims = [grid_size; 3];
        let mut lut = vec![0.0; grid_size * grid_size * grid_size * 3];

        for r in 0..grid_size {
            for g in 0..grid_size {
                for b in 0..grid_size {
                    let idx = ((r * grid_size + g) * grid_size + b) * 3;
                    lut[idx] = r as f64 / (grid_size - 1) as f64;
                    lut[idx + 1] = g as f64 / (grid_size - 1) as f64;
                    lut[idx + 2] = b as f64 / (grid_size - 1) as f64;
                }
            }
        }

        // Test that it's identity
        let inputs = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.5, 0.5, 0.5],
            [0.25, 0.5, 0.75],
        ];

        for input in inputs {
            let output = trilinear_interp_dims(&lut, dims, 3, input);

            for c in 0..3 {
                assert!(
                    (output[c] - input[c]).abs() < 1e-9,
                    "Trilinear identity failed: {:?} -> {:?}",
                    input,
                    output
                );
            }
        }
    }

    #[test]
    fn test_trilinear_dims_identity_noncubic() {
        // A 2x3x2 identity CLUT: channel c at grid point (i,j,k) equals
        // that axis's own fraction, exercising non-equal per-axis dims.
        let dims = [2usize, 3, 2];
        let mut lut = vec![0.0; dims[0] * dims[1] * dims[2] * 3];
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    let base = ((i * dims[1] + j) * dims[2] + k) * 3;
                    lut[base] = i as f64 / (dims[0] - 1) as f64;
                    lut[base + 1] = j as f64 / (dims[1] - 1) as f64;
                    lut[base + 2] = k as f64 / (dims[2] - 1) as f64;
                }
            }
        }

        for input in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.5, 0.25, 0.75]] {
            let out = trilinear_interp_dims(&lut, dims, 3, input);
            for c in 0..3 {
                assert!(
                    (out[c] - input[c]).abs() < 1e-9,
                    "non-cubic CLUT identity failed: {:?} -> {:?}",
                    input,
                    out
                );
            }
        }
    }

    #[test]
    fn test_trilinear_dims_clamps_out_of_range() {
        let dims = [2usize, 2, 2];
        let lut = vec![
            0.0, 0.0, 0.0, // 000
            1.0, 0.0, 0.0, // 100
            0.0, 1.0, 0.0, // 010
            1.0, 1.0, 0.0, // 110
            0.0, 0.0, 1.0, // 001
            1.0, 0.0, 1.0, // 101
            0.0, 1.0, 1.0, // 011
            1.0, 1.0, 1.0, // 111
        ];
        let out = trilinear_interp_dims(&lut, dims, 3, [1.5, -0.5, 2.0]);
        assert_eq!(out, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_lut1d() {
        let lut = vec![0.0, 0.5, 1.0];

        assert!((lut1d_interp(&lut, 0.0) - 0.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 0.5) - 0.5).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 1.0) - 1.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 0.25) - 0.25).abs() < EPSILON);
    }
}
