//! CRC32 checksum over encoded row tables
//!
//! Every decode validates the checksum; a mismatch aborts the decode.

use crc32fast::Hasher;

/// Computes a CRC32 (IEEE) checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
