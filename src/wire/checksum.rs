use sha2::{Digest, Sha256};

use crate::wire::constants::CHECKSUM_SIZE;

/// Computes the header checksum of a payload.
///
/// The checksum is defined as the first 4 bytes of:
///
/// ```text
/// SHA256(SHA256(payload))
/// ```
///
/// It catches transmission errors and incidental corruption. It is not
/// an authenticity check: anyone can recompute it for a forged payload.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let hash = Sha256::digest(Sha256::digest(payload));

    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&hash[..CHECKSUM_SIZE]);
    out
}
