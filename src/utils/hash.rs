// Mon Oct 19 2026 - Alex

/// Non-cryptographic digests used for cache signatures.
pub struct HashComputer;

impl HashComputer {
    /// FNV-1a, 64-bit. Stable across runs and platforms.
    pub fn fnv1a_64(data: &[u8]) -> u64 {
        const FNV_PRIME: u64 = 0x00000100000001B3;
        const FNV_OFFSET: u64 = 0xcbf29ce484222325;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}
