//! Codec parameters record
//!
//! Only the coefficients reach the container (inside each `FileEntry`); the
//! predictor and history fields are consumed at encode time.

pub use dtpk_adpcm::AdpcmInfo as CodecInfo;

impl super::BinarySerializable for CodecInfo {
    const SIZE: usize = CodecInfo::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}
