//! Pixel decoding: apply a [`Profile`]'s transfer curves (and, for `mAB`
//! profiles, the A-curve -> CLUT -> M-curve pipeline) to an RGB buffer.
//!
//! Matrix/TRC decoding dispatches up to three independent channel passes via
//! [`rayon::join`], mirroring a bounded three-worker thread pool: one task
//! per channel, or a single uniform pass when all three TRCs are identical.
//! `mAB` decoding interpolates through a 3D CLUT, which needs all three
//! input channels together, so it parallelizes over pixels instead.

use rayon::prelude::*;

use crate::math::trilinear_interp_dims;
use crate::profile::{ChannelTrc, Curve, MabPipeline};
use crate::Profile;

/// Decode an encoded RGB buffer into linear RGB. Returns a freshly allocated
/// buffer the same length as `pixels`.
pub fn decode_pixels(profile: &Profile, pixels: &[[f32; 3]]) -> Vec<[f32; 3]> {
    if let Some(trc) = profile.matrix_trc() {
        decode_matrix_trc(trc, pixels)
    } else if let Some(pipe) = profile.mab_pipeline() {
        decode_mab(pipe, pixels)
    } else {
        pixels.to_vec()
    }
}

/// Decode `pixels` in place.
pub fn decode_pixels_in_place(profile: &Profile, pixels: &mut [[f32; 3]]) {
    let decoded = decode_pixels(profile, pixels);
    pixels.copy_from_slice(&decoded);
}

fn decode_matrix_trc(trc: &ChannelTrc, pixels: &[[f32; 3]]) -> Vec<[f32; 3]> {
    if trc.uniform {
        return pixels
            .par_iter()
            .map(|p| {
                let mut out = [0f32; 3];
                for (c, v) in out.iter_mut().enumerate() {
                    *v = trc.r.eval(p[c] as f64) as f32;
                }
                out
            })
            .collect();
    }

    // Three independent channel passes, dispatched as nested rayon::join
    // tasks, matching the at-most-3-concurrent-workers pattern of the
    // source pipeline's decode call.
    let (r, (g, b)) = rayon::join(
        || decode_channel(pixels, 0, &trc.r),
        || rayon::join(|| decode_channel(pixels, 1, &trc.g), || decode_channel(pixels, 2, &trc.b)),
    );

    (0..pixels.len()).map(|i| [r[i], g[i], b[i]]).collect()
}

fn decode_channel(pixels: &[[f32; 3]], channel: usize, curve: &Curve) -> Vec<f32> {
    pixels.par_iter().map(|p| curve.eval(p[channel] as f64) as f32).collect()
}

fn decode_mab(pipe: &MabPipeline, pixels: &[[f32; 3]]) -> Vec<[f32; 3]> {
    pixels.par_iter().map(|p| decode_mab_pixel(pipe, *p)).collect()
}

fn decode_mab_pixel(pipe: &MabPipeline, pixel: [f32; 3]) -> [f32; 3] {
    let a_out = [
        pipe.a_curves[0].eval(pixel[0] as f64),
        pipe.a_curves[1].eval(pixel[1] as f64),
        pipe.a_curves[2].eval(pixel[2] as f64),
    ];

    let clut_out = match &pipe.clut {
        Some(clut) => {
            let sample = trilinear_interp_dims(&clut.table, clut.dims, clut.output_channels, a_out);
            [
                sample.first().copied().unwrap_or(0.0),
                sample.get(1).copied().unwrap_or(0.0),
                sample.get(2).copied().unwrap_or(0.0),
            ]
        }
        None => a_out,
    };

    let m_out = [
        pipe.m_curves[0].eval(clut_out[0]),
        pipe.m_curves[1].eval(clut_out[1]),
        pipe.m_curves[2].eval(clut_out[2]),
    ];

    [m_out[0] as f32, m_out[1] as f32, m_out[2] as f32]
}
