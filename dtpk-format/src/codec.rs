//! ADPCM codec capability
//!
//! The container only needs three operations from a codec. Keeping them behind
//! a trait lets the builder and reader run against a fake codec in tests.

use dtpk_adpcm::{bytes_for_adpcm_buffer, decode_adpcm, encode_adpcm};

use crate::CodecError;
use crate::formats::CodecInfo;

/// Stateless transform between PCM samples and ADPCM bytes
pub trait AdpcmCodec {
    /// Compressed size for `sample_count` samples
    fn required_encoded_size(&self, sample_count: usize) -> usize;

    /// Encode mono 16-bit samples
    fn encode(&self, samples: &[i16]) -> Result<(Vec<u8>, CodecInfo), CodecError>;

    /// Decode `sample_count` samples using `info`'s coefficients
    fn decode(
        &self,
        data: &[u8],
        info: &CodecInfo,
        sample_count: usize,
    ) -> Result<Vec<i16>, CodecError>;
}

/// GameCube DSP-ADPCM, backed by the `dtpk-adpcm` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct DspAdpcmCodec;

impl AdpcmCodec for DspAdpcmCodec {
    fn required_encoded_size(&self, sample_count: usize) -> usize {
        bytes_for_adpcm_buffer(sample_count)
    }

    fn encode(&self, samples: &[i16]) -> Result<(Vec<u8>, CodecInfo), CodecError> {
        Ok(encode_adpcm(samples))
    }

    fn decode(
        &self,
        data: &[u8],
        info: &CodecInfo,
        sample_count: usize,
    ) -> Result<Vec<i16>, CodecError> {
        Ok(decode_adpcm(data, &info.coef, sample_count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsp_codec_sizes() {
        let codec = DspAdpcmCodec;
        let samples = vec![500i16; 100];
        let (data, _info) = codec.encode(&samples).unwrap();
        assert_eq!(data.len(), codec.required_encoded_size(samples.len()));
        assert_eq!(data.len(), 64);
    }

    #[test]
    fn test_dsp_codec_decode_truncated() {
        let codec = DspAdpcmCodec;
        let info = CodecInfo::default();
        let result = codec.decode(&[0u8; 8], &info, 28);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}
