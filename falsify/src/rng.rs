//! Seeded randomness provider with replayable state and independent substreams.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::PropertyError;

/// Identity of the algorithm behind [`SourceOfRandomness`]
pub const ALGORITHM: &str = "ChaCha8";

/// Words skipped by [`SourceOfRandomness::jump`]
const JUMP_WORDS: u128 = 1 << 64;

/// Snapshot of a [`SourceOfRandomness`] for deterministic replay
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomState {
    pub algorithm: String,
    pub seed: u64,
    pub stream: u64,
    pub word_pos: u128,
    pub splits: u64,
}

/// Random source used by generators
///
/// Every source is fully determined by its seed, its stream and its position in
/// that stream, which is what [`save_state`](Self::save_state) captures.
#[derive(Debug, Clone)]
pub struct SourceOfRandomness {
    rng: ChaCha8Rng,
    seed: u64,
    splits: u64,
}

impl SourceOfRandomness {
    /// Create a source from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            splits: 0,
        }
    }

    /// Create a source from a fresh random seed
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_long(&mut self) -> i64 {
        self.rng.next_u64() as i64
    }

    pub fn save_state(&self) -> RandomState {
        RandomState {
            algorithm: ALGORITHM.to_string(),
            seed: self.seed,
            stream: self.rng.get_stream(),
            word_pos: self.rng.get_word_pos(),
            splits: self.splits,
        }
    }

    /// Restore a saved state, refusing states produced by another algorithm
    pub fn restore_state(&mut self, state: &RandomState) -> Result<(), PropertyError> {
        if state.algorithm != ALGORITHM {
            return Err(PropertyError::RandomStateMismatch {
                expected: ALGORITHM.to_string(),
                found: state.algorithm.clone(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(state.seed);
        rng.set_stream(state.stream);
        rng.set_word_pos(state.word_pos);

        self.rng = rng;
        self.seed = state.seed;
        self.splits = state.splits;
        Ok(())
    }

    /// Create an independent source on a new stream
    ///
    /// The parent does not draw any value to do so, its future output is unchanged.
    pub fn split(&mut self) -> Self {
        self.splits += 1;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(mix(self.rng.get_stream().wrapping_add(self.splits)));
        Self {
            rng,
            seed: self.seed,
            splits: 0,
        }
    }

    /// Skip 2^64 words ahead in the current stream
    pub fn jump(&mut self) {
        let position = self.rng.get_word_pos();
        self.rng.set_word_pos(position.wrapping_add(JUMP_WORDS));
    }
}

impl RngCore for SourceOfRandomness {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

// splitmix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Create a random source, seeded when a seed is given
pub fn create_rng(seed: Option<u64>) -> SourceOfRandomness {
    match seed {
        Some(seed) => SourceOfRandomness::from_seed(seed),
        None => SourceOfRandomness::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(source: &mut SourceOfRandomness, n: usize) -> Vec<i64> {
        (0..n).map(|_| source.next_long()).collect()
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SourceOfRandomness::from_seed(42);
        let mut b = create_rng(Some(42));
        assert_eq!(draw(&mut a, 10), draw(&mut b, 10));
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = SourceOfRandomness::from_seed(1);
        let mut b = SourceOfRandomness::from_seed(2);
        assert_ne!(draw(&mut a, 4), draw(&mut b, 4));
    }

    #[test]
    fn test_save_and_restore_replays() {
        let mut source = SourceOfRandomness::from_seed(7);
        draw(&mut source, 3);
        let state = source.save_state();
        let expected = draw(&mut source, 5);

        let mut replay = SourceOfRandomness::from_seed(0);
        replay.restore_state(&state).unwrap();
        assert_eq!(draw(&mut replay, 5), expected);
    }

    #[test]
    fn test_restore_rejects_other_algorithm() {
        let mut source = SourceOfRandomness::from_seed(7);
        let mut state = source.save_state();
        state.algorithm = "Xoshiro256".to_string();

        assert_eq!(
            source.restore_state(&state),
            Err(PropertyError::RandomStateMismatch {
                expected: "ChaCha8".to_string(),
                found: "Xoshiro256".to_string(),
            })
        );
    }

    #[test]
    fn test_split_does_not_disturb_parent() {
        let mut parent = SourceOfRandomness::from_seed(11);
        let mut untouched = parent.clone();

        let mut child = parent.split();
        let mut second_child = parent.split();

        let parent_values = draw(&mut parent, 5);
        assert_eq!(parent_values, draw(&mut untouched, 5));
        assert_ne!(draw(&mut child, 5), parent_values);
        assert_ne!(draw(&mut second_child, 5), parent_values);
    }

    #[test]
    fn test_split_is_deterministic() {
        let mut a = SourceOfRandomness::from_seed(5);
        let mut b = SourceOfRandomness::from_seed(5);
        assert_eq!(draw(&mut a.split(), 3), draw(&mut b.split(), 3));
    }

    #[test]
    fn test_jump_moves_ahead() {
        let mut source = SourceOfRandomness::from_seed(3);
        let mut jumped = source.clone();
        jumped.jump();
        assert_eq!(jumped.save_state().word_pos, source.save_state().word_pos + (1 << 64));
        assert_ne!(draw(&mut source, 3), draw(&mut jumped, 3));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_random_state_serializes() {
        let state = SourceOfRandomness::from_seed(9).save_state();
        let json = serde_json::to_string(&state).unwrap();
        let parsed: RandomState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
