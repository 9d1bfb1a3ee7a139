//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG used for every random draw a session makes:
//! spawn counts, category picks, scaling decisions and even event identifiers.
//!
//! # Determinism
//!
//! Same seed → same stream of envelopes (timestamps aside). This is what
//! lets tests pin down scaling decisions and burst sizes exactly.

use uuid::{Builder, Uuid};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use flowprobe_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift cannot leave the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Generate random value in range [min, max]
    ///
    /// # Example
    /// ```
    /// use flowprobe_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let value = rng.range_inclusive(1, 50);
    /// assert!((1..=50).contains(&value));
    /// ```
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        self.range(min, max + 1)
    }

    /// Pick a uniformly random index into a collection of `len` items.
    ///
    /// Returns `None` for an empty collection.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.range(0, len as i64) as usize)
    }

    /// Current internal state
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    ///
    /// ```
    /// use flowprobe_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(42);
    /// let jitter = rng.uniform(0.7, 1.3);
    /// assert!(jitter >= 0.7 && jitter < 1.3);
    /// ```
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Bernoulli trial: true with the given probability.
    ///
    /// A probability of 0.0 never fires, 1.0 always fires.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Draw a random (version 4) UUID from this stream.
    pub fn uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.next().to_le_bytes());
        bytes[8..].copy_from_slice(&self.next().to_le_bytes());
        Builder::from_random_bytes(bytes).into_uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = RngManager::new(12345);
        rng.range(100, 50);
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                (0.0..1.0).contains(&val),
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = RngManager::new(99);
        for _ in 0..500 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_index_empty() {
        let mut rng = RngManager::new(1);
        assert_eq!(rng.index(0), None);
        assert_eq!(rng.index(1), Some(0));
    }

    #[test]
    fn test_uuid_is_v4() {
        let mut rng = RngManager::new(2024);
        let id = rng.uuid();
        assert_eq!(id.get_version_num(), 4);
    }
}
