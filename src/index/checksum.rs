//! CRC32 checksum computation for index records
//!
//! Every record carries a trailing checksum over all preceding bytes, and
//! every read validates it. A mismatch aborts the read; during boot it
//! aborts startup.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
///
/// Deterministic: the same input always produces the same output.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verifies that the computed checksum matches the expected checksum.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}
