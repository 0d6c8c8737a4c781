//! DSP-ADPCM encoder implementation
//!
//! This module handles encoding PCM samples to ADPCM frames.
//! Note: This is a pure codec - no container headers are written. The caller
//! (dtpk-format) stores the coefficients and byte counts in its file entries.

use crate::{
    AdpcmInfo, BYTES_PER_FRAME, COEF_COUNT, MAX_SCALE, SAMPLES_PER_FRAME, bytes_for_adpcm_buffer,
    clamp_i16, correlate_coefs,
};

/// Per-coefficient-pair trial result
struct FrameTrial {
    /// Reconstructed samples, with the two history samples in front
    reconstructed: [i32; SAMPLES_PER_FRAME + 2],
    residuals: [i32; SAMPLES_PER_FRAME],
    scale: i32,
    error: f64,
}

/// Encode one frame of up to 14 samples
///
/// Tries all 8 coefficient pairs and keeps the one with the lowest squared
/// error.
///
/// # Arguments
/// * `pcm` - `[hist2, hist1, s0..s13]`; on return the sample slots hold the
///   decoder's reconstruction so the next frame predicts from it
/// * `sample_count` - Valid samples in `pcm[2..]`
/// * `coef` - Coefficient table (8 pairs)
///
/// # Returns
/// The 8 encoded bytes
pub fn encode_frame(
    pcm: &mut [i32; SAMPLES_PER_FRAME + 2],
    sample_count: usize,
    coef: &[i16; COEF_COUNT],
) -> [u8; BYTES_PER_FRAME] {
    let sample_count = sample_count.min(SAMPLES_PER_FRAME);

    let mut best_index = 0;
    let mut best: Option<FrameTrial> = None;

    for pair in 0..COEF_COUNT / 2 {
        let c1 = coef[pair * 2] as i64;
        let c2 = coef[pair * 2 + 1] as i64;
        let trial = trial_encode(pcm, sample_count, c1, c2);

        if best.as_ref().is_none_or(|b| trial.error < b.error) {
            best_index = pair;
            best = Some(trial);
        }
    }

    let mut out = [0u8; BYTES_PER_FRAME];
    let Some(best) = best else {
        return out;
    };

    pcm[2..2 + sample_count].copy_from_slice(&best.reconstructed[2..2 + sample_count]);

    out[0] = ((best_index << 4) as u8) | (best.scale & 0xF) as u8;
    for i in 0..SAMPLES_PER_FRAME / 2 {
        let hi = (best.residuals[i * 2] & 0xF) as u8;
        let lo = (best.residuals[i * 2 + 1] & 0xF) as u8;
        out[1 + i] = (hi << 4) | lo;
    }

    out
}

/// Quantize a frame against one coefficient pair
fn trial_encode(
    pcm: &[i32; SAMPLES_PER_FRAME + 2],
    sample_count: usize,
    c1: i64,
    c2: i64,
) -> FrameTrial {
    let mut reconstructed = [0i32; SAMPLES_PER_FRAME + 2];
    reconstructed[0] = pcm[0];
    reconstructed[1] = pcm[1];

    // Largest prediction error picks the starting scale
    let mut distance = 0i64;
    for s in 0..sample_count {
        let predicted = (pcm[s] as i64 * c2 + pcm[s + 1] as i64 * c1) / 2048;
        let residual = (pcm[s + 2] as i64 - predicted).clamp(-32768, 32767);
        if residual.abs() > distance.abs() {
            distance = residual;
        }
    }

    let mut scale = 0;
    while scale <= 12 && !(-8..=7).contains(&distance) {
        scale += 1;
        distance /= 2;
    }
    scale = if scale <= 1 { -1 } else { scale - 2 };

    let mut residuals = [0i32; SAMPLES_PER_FRAME];
    let mut error;

    loop {
        scale += 1;
        error = 0.0;
        let mut overflow = 0i32;

        for s in 0..sample_count {
            let predicted =
                reconstructed[s] as i64 * c2 + reconstructed[s + 1] as i64 * c1;
            let delta = ((pcm[s + 2] as i64) << 11) - predicted;
            let delta = (delta / 2048) as f64 / (1i64 << scale) as f64;

            // Round half away from zero (slightly under half, as the reference does)
            let mut quantized = if delta > 0.0 {
                (delta + 0.4999999) as i32
            } else {
                (delta - 0.4999999) as i32
            };

            if quantized < -8 {
                overflow = overflow.max(-8 - quantized);
                quantized = -8;
            } else if quantized > 7 {
                overflow = overflow.max(quantized - 7);
                quantized = 7;
            }
            residuals[s] = quantized;

            let expanded = (predicted + (((quantized as i64) << scale) << 11) + 1024) >> 11;
            let sample = clamp_i16(expanded.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
            reconstructed[s + 2] = sample;

            let diff = (pcm[s + 2] - sample) as f64;
            error += diff * diff;
        }

        if scale >= 12 {
            break;
        }

        let mut x = overflow + 8;
        while x > 256 {
            scale += 1;
            if scale >= 12 {
                scale = MAX_SCALE;
            }
            x >>= 1;
        }

        if overflow <= 1 {
            break;
        }
    }

    for r in residuals.iter_mut().skip(sample_count) {
        *r = 0;
    }

    FrameTrial {
        reconstructed,
        residuals,
        scale,
        error,
    }
}

/// Encode PCM samples to ADPCM frames
///
/// # Arguments
/// * `samples` - Input PCM samples (mono, 16-bit)
///
/// # Returns
/// The encoded frames (`bytes_for_adpcm_buffer(samples.len())` bytes) and the
/// codec parameters needed to decode them
pub fn encode_adpcm(samples: &[i16]) -> (Vec<u8>, AdpcmInfo) {
    let coef = correlate_coefs(samples);
    let mut output = Vec::with_capacity(bytes_for_adpcm_buffer(samples.len()));

    // Slots 0 and 1 carry history across frames
    let mut pcm = [0i32; SAMPLES_PER_FRAME + 2];

    for chunk in samples.chunks(SAMPLES_PER_FRAME) {
        for (i, slot) in pcm[2..].iter_mut().enumerate() {
            *slot = chunk.get(i).copied().unwrap_or(0) as i32;
        }

        let frame = encode_frame(&mut pcm, SAMPLES_PER_FRAME, &coef);
        output.extend_from_slice(&frame);

        pcm[0] = pcm[SAMPLES_PER_FRAME];
        pcm[1] = pcm[SAMPLES_PER_FRAME + 1];
    }

    let mut info = AdpcmInfo::from_coefs(coef);
    info.pred_scale = output.first().copied().unwrap_or(0) as u16;
    info.loop_pred_scale = info.pred_scale;

    (output, info)
}
