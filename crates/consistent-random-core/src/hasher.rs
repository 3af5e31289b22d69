//! Seed hasher.
//!
//! The hash algorithm, the separator byte and the digest-to-integer
//! conversion are part of the reproducibility contract: changing any of them
//! changes every value ever derived from a given scope seed.

use sha1::{Digest, Sha1};

/// Reserved byte placed between the scope seed and the name, and between the
/// elements of a list seed.
pub const SEPARATOR: u8 = 0x1C;

/// Length in bytes of a digest produced by [`digest`].
pub const DIGEST_LEN: usize = 20;

/// Hashes `scope_seed || SEPARATOR || name` with SHA-1.
#[must_use]
pub fn digest(scope_seed: &[u8], name: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha1::new();
    hasher.update(scope_seed);
    hasher.update([SEPARATOR]);
    hasher.update(name);
    hasher.finalize().into()
}

/// Interprets the first 8 bytes of a digest as a big-endian `u64`.
#[must_use]
pub fn seed_from_digest(digest: &[u8; DIGEST_LEN]) -> u64 {
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
