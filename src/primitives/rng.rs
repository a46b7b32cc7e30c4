//! Per-session random number generator.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_core::{CryptoRng, OsRng, RngCore};

/// Random number generator owned by a single protocol session.
///
/// Seeded exactly once, either from the operating system or from an explicit
/// seed, and never reseeded afterwards. Every party owns its own instance;
/// sessions must not share one.
pub struct SessionRng(StdRng);

impl SessionRng {
    /// Creates a generator seeded from operating-system entropy.
    pub fn new() -> Self {
        let mut seed = <StdRng as SeedableRng>::Seed::default();
        OsRng.fill_bytes(&mut seed);
        Self(StdRng::from_seed(seed))
    }

    /// Creates a deterministic generator from a 64-bit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Derives an independent generator for the `index`-th session.
    ///
    /// With no base seed every session draws fresh entropy.
    pub fn for_session(base_seed: Option<u64>, index: u64) -> Self {
        match base_seed {
            Some(seed) => Self::from_seed(seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            None => Self::new(),
        }
    }
}

impl Default for SessionRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SessionRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SessionRng {}
