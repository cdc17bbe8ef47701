use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random source owned by a world.
pub type SimRng = ChaCha8Rng;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}
