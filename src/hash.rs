//! Position functions for placing node identifiers and lookup keys on the
//! ring.

/// Maps bytes to a position on the 32-bit ring.
///
/// Implementations must be pure: the same input always yields the same
/// position. Uniformity and speed matter; collision resistance does not.
pub trait RingHasher: Send + Sync {
    fn position(&self, key: &[u8]) -> u32;
}

/// CRC-32 (IEEE) checksum of the key. This is the default hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl RingHasher for Crc32 {
    fn position(&self, key: &[u8]) -> u32 {
        crc32fast::hash(key)
    }
}

/// The leading four bytes of the SHA-256 digest, read big-endian.
#[cfg(feature = "sha256")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

#[cfg(feature = "sha256")]
impl RingHasher for Sha256 {
    fn position(&self, key: &[u8]) -> u32 {
        use sha2::Digest;

        let hash = sha2::Sha256::digest(key);
        u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
    }
}

/// Any plain function or closure can act as a hasher, which is mostly useful
/// for pinning positions in tests.
impl<F> RingHasher for F
where
    F: Fn(&[u8]) -> u32 + Send + Sync,
{
    fn position(&self, key: &[u8]) -> u32 {
        self(key)
    }
}
