//! DSP-ADPCM decoder implementation
//!
//! This module handles decoding ADPCM frames to PCM samples.
//! Note: This is a pure codec - the caller provides the coefficients and the
//! sample count (dtpk-format derives it from the entry's byte count).

use crate::{AdpcmError, BYTES_PER_FRAME, COEF_COUNT, SAMPLES_PER_FRAME, bytes_for_adpcm_buffer};

/// Decode a single frame (8 bytes = 14 samples)
///
/// # Arguments
/// * `frame` - The 8 encoded bytes
/// * `coef` - Coefficient table (8 pairs)
/// * `hist` - Decoder history `[hist1, hist2]` (updated during decoding)
/// * `output` - Output buffer for decoded samples
///
/// # Returns
/// Number of samples decoded (up to 14, or `output.len()` if smaller)
pub fn decode_frame(
    frame: &[u8; BYTES_PER_FRAME],
    coef: &[i16; COEF_COUNT],
    hist: &mut [i32; 2],
    output: &mut [i16],
) -> Result<usize, AdpcmError> {
    let header = frame[0];
    let coef_index = (header >> 4) as usize;
    if coef_index >= COEF_COUNT / 2 {
        return Err(AdpcmError::InvalidCoefIndex(header >> 4));
    }

    let scale = 1i64 << (header & 0xF);
    let c1 = coef[coef_index * 2] as i64;
    let c2 = coef[coef_index * 2 + 1] as i64;

    let count = output.len().min(SAMPLES_PER_FRAME);
    for (i, out) in output.iter_mut().take(count).enumerate() {
        let byte = frame[1 + i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0xF };
        let residual = if nibble >= 8 {
            nibble as i64 - 16
        } else {
            nibble as i64
        };

        let predicted = c1 * hist[0] as i64 + c2 * hist[1] as i64;
        let sample = (((residual * scale) << 11) + 1024 + predicted) >> 11;
        let sample = sample.clamp(-32768, 32767) as i32;

        hist[1] = hist[0];
        hist[0] = sample;
        *out = sample as i16;
    }

    Ok(count)
}

/// Decode ADPCM data to PCM
///
/// # Arguments
/// * `adpcm_data` - Raw ADPCM frames
/// * `coef` - Coefficient table the stream was encoded with
/// * `sample_count` - Number of samples to decode
///
/// # Errors
/// Returns `AdpcmError` if the data is too short for `sample_count` or a
/// frame selects an invalid coefficient pair
pub fn decode_adpcm(
    adpcm_data: &[u8],
    coef: &[i16; COEF_COUNT],
    sample_count: usize,
) -> Result<Vec<i16>, AdpcmError> {
    let needed = bytes_for_adpcm_buffer(sample_count);
    if adpcm_data.len() < needed {
        return Err(AdpcmError::TruncatedData {
            needed,
            available: adpcm_data.len(),
        });
    }

    let mut output = vec![0i16; sample_count];
    let mut hist = [0i32; 2];

    for (frame, out) in adpcm_data
        .chunks_exact(BYTES_PER_FRAME)
        .zip(output.chunks_mut(SAMPLES_PER_FRAME))
    {
        let mut bytes = [0u8; BYTES_PER_FRAME];
        bytes.copy_from_slice(frame);
        decode_frame(&bytes, coef, &mut hist, out)?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_zero_frame() {
        let coef = [0i16; COEF_COUNT];
        let frame = [0u8; BYTES_PER_FRAME];
        let mut hist = [0i32; 2];
        let mut out = [1i16; SAMPLES_PER_FRAME];

        let n = decode_frame(&frame, &coef, &mut hist, &mut out).unwrap();
        assert_eq!(n, 14);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_decode_residuals_without_prediction() {
        // Scale 0, coefficient pair 0 = (0, 0): samples equal the residuals
        let coef = [0i16; COEF_COUNT];
        let frame = [0x00, 0x17, 0x8F, 0, 0, 0, 0, 0];
        let mut hist = [0i32; 2];
        let mut out = [0i16; SAMPLES_PER_FRAME];

        decode_frame(&frame, &coef, &mut hist, &mut out).unwrap();
        assert_eq!(&out[..4], &[1, 7, -8, -1]);
    }

    #[test]
    fn test_decode_uses_history() {
        // c1 = 2048 (1.0): each sample repeats the previous plus the residual
        let mut coef = [0i16; COEF_COUNT];
        coef[0] = 2048;
        let frame = [0x00, 0x11, 0x11, 0, 0, 0, 0, 0];
        let mut hist = [0i32; 2];
        let mut out = [0i16; SAMPLES_PER_FRAME];

        decode_frame(&frame, &coef, &mut hist, &mut out).unwrap();
        assert_eq!(&out[..5], &[1, 2, 3, 4, 4]);
        assert_eq!(hist[0], 4);
    }

    #[test]
    fn test_decode_invalid_coef_index() {
        let coef = [0i16; COEF_COUNT];
        let result = decode_adpcm(&[0x80, 0, 0, 0, 0, 0, 0, 0], &coef, 14);
        assert_eq!(result, Err(AdpcmError::InvalidCoefIndex(8)));
    }

    #[test]
    fn test_decode_truncated() {
        let coef = [0i16; COEF_COUNT];
        let result = decode_adpcm(&[0u8; 8], &coef, 15);
        assert_eq!(
            result,
            Err(AdpcmError::TruncatedData {
                needed: 16,
                available: 8
            })
        );
    }

    #[test]
    fn test_decode_partial_frame() {
        let coef = [0i16; COEF_COUNT];
        let decoded = decode_adpcm(&[0u8; 16], &coef, 20).unwrap();
        assert_eq!(decoded.len(), 20);
    }

    #[test]
    fn test_decode_empty() {
        let coef = [0i16; COEF_COUNT];
        assert_eq!(decode_adpcm(&[], &coef, 0).unwrap(), Vec::<i16>::new());
    }
}
