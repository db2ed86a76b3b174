//! Deterministic RNG for bunch particle sampling.

use rand::rngs::StdRng;
use rand::SeedableRng;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Seeded generator handle behind every sampled particle cloud.
///
/// A master `seed: u64` comes from the run configuration. Each bunch draws
/// its cloud from an independent substream whose seed is SipHash-1-3 of
/// `(master_seed, substream_id)` under fixed zero keys, so identical
/// configurations reproduce identical clouds on every platform and the
/// species stay insensitive to each other's draw counts.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a handle seeded directly from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a handle on one derived substream of a master seed.
    pub fn for_substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Mutable access to the underlying generator for distribution sampling.
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
