//! DTPK-ADPCM: GameCube DSP-ADPCM codec for DTPK soundbanks
//!
//! **This is a pure codec** - it handles only the compression/decompression of
//! audio data. Container bookkeeping (sample rate, byte ranges, where the
//! coefficients are stored) is handled by the caller (dtpk-format's `FileEntry`).
//!
//! # Frame Format
//!
//! ```text
//! Frame (8 bytes, repeats):
//!   0x00: predictor/scale (u8)
//!           high nibble: coefficient pair index (0-7)
//!           low nibble:  scale exponent (0-11)
//!   0x01: 14 signed 4-bit residuals, high nibble first
//! ```
//!
//! Each sample is reconstructed as
//! `clamp((residual << scale << 11) + c1 * hist1 + c2 * hist2 + 1024) >> 11`,
//! where `(c1, c2)` is the coefficient pair selected by the frame header.
//!
//! # Compression
//!
//! 14 samples (28 bytes of PCM) become 8 bytes: 3.5:1.
//!
//! # Usage
//!
//! ```
//! use dtpk_adpcm::{decode_adpcm, encode_adpcm, samples_for_adpcm_bytes};
//!
//! let samples: Vec<i16> = (0..1000).map(|i| ((i * 37) % 2000 - 1000) as i16).collect();
//! let (adpcm, info) = encode_adpcm(&samples);
//!
//! // Decoding always yields whole frames (14 samples each)
//! let count = samples_for_adpcm_bytes(adpcm.len());
//! let decoded = decode_adpcm(&adpcm, &info.coef, count).unwrap();
//! assert_eq!(decoded.len(), 1008);
//! ```

mod coefs;
mod decode;
mod encode;

pub use coefs::correlate_coefs;
pub use decode::{decode_adpcm, decode_frame};
pub use encode::{encode_adpcm, encode_frame};

// =============================================================================
// Constants
// =============================================================================

/// PCM samples carried by one ADPCM frame
pub const SAMPLES_PER_FRAME: usize = 14;

/// Encoded size of one ADPCM frame (1 header byte + 7 bytes of nibbles)
pub const BYTES_PER_FRAME: usize = 8;

/// Number of coefficients (8 pairs)
pub const COEF_COUNT: usize = 16;

/// Largest scale exponent the encoder emits
pub const MAX_SCALE: i32 = 11;

// =============================================================================
// Codec Info
// =============================================================================

/// Codec parameters produced by the encoder
///
/// Mirrors the DSP `ADPCMINFO` block. Only `coef` is needed to decode a
/// stream from its start; the predictor/history fields describe the initial
/// decoder state and the loop start state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdpcmInfo {
    /// 8 coefficient pairs, stored `[c1_0, c2_0, c1_1, c2_1, ...]`
    pub coef: [i16; COEF_COUNT],
    pub gain: u16,
    /// Header byte of the first frame
    pub pred_scale: u16,
    pub yn1: i16,
    pub yn2: i16,
    pub loop_pred_scale: u16,
    pub loop_yn1: i16,
    pub loop_yn2: i16,
}

impl AdpcmInfo {
    pub const SIZE: usize = 46;

    /// Create info holding only coefficients (decoder state zeroed)
    pub fn from_coefs(coef: [i16; COEF_COUNT]) -> Self {
        Self {
            coef,
            ..Self::default()
        }
    }

    /// Write to bytes (big-endian, same field order as the DSP header)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (i, c) in self.coef.iter().enumerate() {
            bytes[i * 2..i * 2 + 2].copy_from_slice(&c.to_be_bytes());
        }
        bytes[32..34].copy_from_slice(&self.gain.to_be_bytes());
        bytes[34..36].copy_from_slice(&self.pred_scale.to_be_bytes());
        bytes[36..38].copy_from_slice(&self.yn1.to_be_bytes());
        bytes[38..40].copy_from_slice(&self.yn2.to_be_bytes());
        bytes[40..42].copy_from_slice(&self.loop_pred_scale.to_be_bytes());
        bytes[42..44].copy_from_slice(&self.loop_yn1.to_be_bytes());
        bytes[44..46].copy_from_slice(&self.loop_yn2.to_be_bytes());
        bytes
    }

    /// Read from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u16_at = |o: usize| u16::from_be_bytes([bytes[o], bytes[o + 1]]);
        let i16_at = |o: usize| i16::from_be_bytes([bytes[o], bytes[o + 1]]);

        let mut coef = [0i16; COEF_COUNT];
        for (i, c) in coef.iter_mut().enumerate() {
            *c = i16_at(i * 2);
        }

        Some(Self {
            coef,
            gain: u16_at(32),
            pred_scale: u16_at(34),
            yn1: i16_at(36),
            yn2: i16_at(38),
            loop_pred_scale: u16_at(40),
            loop_yn1: i16_at(42),
            loop_yn2: i16_at(44),
        })
    }
}

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur during ADPCM decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdpcmError {
    /// Fewer bytes than the requested sample count needs
    TruncatedData { needed: usize, available: usize },
    /// Frame header selects a coefficient pair outside 0-7
    InvalidCoefIndex(u8),
}

impl core::fmt::Display for AdpcmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AdpcmError::TruncatedData { needed, available } => write!(
                f,
                "truncated ADPCM data ({} bytes needed, {} available)",
                needed, available
            ),
            AdpcmError::InvalidCoefIndex(idx) => {
                write!(f, "invalid coefficient index {} (must be 0-7)", idx)
            }
        }
    }
}

impl std::error::Error for AdpcmError {}

// =============================================================================
// Helper Functions
// =============================================================================

/// Size of the ADPCM buffer needed for `samples` PCM samples
pub fn bytes_for_adpcm_buffer(samples: usize) -> usize {
    samples.div_ceil(SAMPLES_PER_FRAME) * BYTES_PER_FRAME
}

/// Size in bytes of the PCM buffer a decode of `samples` samples fills
pub fn bytes_for_pcm_buffer(samples: usize) -> usize {
    samples.div_ceil(SAMPLES_PER_FRAME) * SAMPLES_PER_FRAME * 2
}

/// Number of samples stored in `bytes` bytes of ADPCM data (whole frames only)
pub fn samples_for_adpcm_bytes(bytes: usize) -> usize {
    (bytes / BYTES_PER_FRAME) * SAMPLES_PER_FRAME
}

/// Clamp value to 16-bit signed range
#[inline]
pub(crate) fn clamp_i16(v: i32) -> i32 {
    v.clamp(-32768, 32767)
}

// =============================================================================
// Tests
// =============================================================================
