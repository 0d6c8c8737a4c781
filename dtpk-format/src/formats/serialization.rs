//! Binary serialization trait for fixed-size records.
//!
//! Both on-disk records (`FileEntry`, `CodecInfo`) implement
//! `BinarySerializable` so generic code (the reader, tests) can size and parse
//! them uniformly, while each type keeps its own `to_bytes()` returning a
//! fixed-size array.

/// Trait for binary-serializable fixed-size records.
///
/// Uses `Vec<u8>` for the return type because associated consts cannot size
/// arrays in trait signatures yet.
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{CodecInfo, FileEntry};

    fn record_size<T: BinarySerializable>() -> usize {
        T::SIZE
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(record_size::<FileEntry>(), 68);
        assert_eq!(record_size::<CodecInfo>(), 46);
    }

    #[test]
    fn test_deserialize_insufficient_bytes() {
        assert!(<FileEntry as BinarySerializable>::deserialize(&[0; 67]).is_none());
        assert!(<CodecInfo as BinarySerializable>::deserialize(&[0; 45]).is_none());
    }

    #[test]
    fn test_codec_info_trait() {
        let info = CodecInfo::from_coefs([7; 16]);
        let bytes = info.serialize();
        assert_eq!(bytes.len(), 46);
        assert_eq!(CodecInfo::deserialize(&bytes), Some(info));
    }
}
