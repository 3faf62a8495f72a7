//! Deterministic random stream
//!
//! Every stochastic draw in the engine (event triggering, event intensity,
//! traffic jitter, project mix picks, recruiting yield, value-added demand)
//! consumes from one `RngStream`. The stream's position is captured as a
//! `(seed, word_pos)` pair, so a run split across multiple simulate calls
//! replays byte-identically to a single uninterrupted run.
//!
//! ChaCha is counter-based: re-seeding and restoring the word position
//! reconstructs the exact stream state without serializing the cipher.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A resumable position in a seeded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCursor {
    pub seed: u64,
    pub word_pos: u128,
}

/// Seeded random stream with exact capture/restore.
#[derive(Debug, Clone)]
pub struct RngStream {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RngStream {
    /// Fresh stream at position zero.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Resume a stream from a previously captured position. `None` means
    /// no progress has been made since the seed was set.
    pub fn resume(seed: u64, word_pos: Option<u128>) -> Self {
        let mut stream = Self::new(seed);
        if let Some(pos) = word_pos {
            stream.rng.set_word_pos(pos);
        }
        stream
    }

    pub fn capture(&self) -> RngCursor {
        RngCursor {
            seed: self.seed,
            word_pos: self.rng.get_word_pos(),
        }
    }

    pub fn restore(cursor: RngCursor) -> Self {
        Self::resume(cursor.seed, Some(cursor.word_pos))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn word_pos(&self) -> u128 {
        self.rng.get_word_pos()
    }

    /// Uniform draw in [0, 1).
    pub fn unit_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform integer draw, both bounds inclusive.
    pub fn range_i64(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Uniform draw in [low, high). Bounds are sorted first.
    pub fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        let (lo, hi) = if high < low { (high, low) } else { (low, high) };
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Index draw for picking one element of a non-empty slice.
    pub fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    /// Symmetric integer jitter: base perturbed within +-round(base * volatility),
    /// floored at zero. Non-positive base consumes no draw.
    pub fn jitter_count(&mut self, base: u32, volatility: f64) -> u32 {
        if base == 0 {
            return 0;
        }
        let delta = (base as f64 * volatility.max(0.0)).round() as i64;
        let jittered = base as i64 + self.range_i64(-delta, delta);
        jittered.max(0) as u32
    }

    /// Normal draw via Box-Muller. Zero or negative sigma returns the mean
    /// without consuming the stream.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        let u1 = 1.0 - self.unit_f64();
        let u2 = self.unit_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }

    /// Poisson draw, Knuth's method. Suitable for the small lambdas this
    /// engine uses (recruiting yield, brokerage deals).
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        if lambda <= 0.0 {
            return 0;
        }
        let limit = (-lambda).exp();
        let mut k: u32 = 0;
        let mut p = 1.0;
        while p > limit {
            k += 1;
            p *= self.unit_f64();
        }
        k.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_restore_resumes_identically() {
        let mut a = RngStream::new(42);
        for _ in 0..17 {
            a.unit_f64();
        }
        let cursor = a.capture();
        let tail_a: Vec<f64> = (0..8).map(|_| a.unit_f64()).collect();

        let mut b = RngStream::restore(cursor);
        let tail_b: Vec<f64> = (0..8).map(|_| b.unit_f64()).collect();
        assert_eq!(tail_a, tail_b);
    }

    #[test]
    fn test_split_draws_match_continuous() {
        let mut continuous = RngStream::new(7);
        let expected: Vec<u32> = (0..10).map(|_| continuous.next_u32()).collect();

        let mut first = RngStream::new(7);
        let mut head: Vec<u32> = (0..4).map(|_| first.next_u32()).collect();
        let mut second = RngStream::resume(7, Some(first.word_pos()));
        head.extend((0..6).map(|_| second.next_u32()));
        assert_eq!(head, expected);
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = RngStream::new(42);
        for _ in 0..200 {
            let v = rng.jitter_count(1000, 0.10);
            assert!((900..=1100).contains(&v), "jitter {} out of bounds", v);
        }
    }

    #[test]
    fn test_jitter_zero_volatility_is_exact() {
        let mut rng = RngStream::new(42);
        assert_eq!(rng.jitter_count(1000, 0.0), 1000);
        assert_eq!(rng.jitter_count(0, 0.5), 0);
    }

    #[test]
    fn test_normal_zero_sigma_consumes_nothing() {
        let mut rng = RngStream::new(42);
        let before = rng.word_pos();
        assert_eq!(rng.normal(5.0, 0.0), 5.0);
        assert_eq!(rng.word_pos(), before);
    }

    #[test]
    fn test_poisson_zero_lambda() {
        let mut rng = RngStream::new(42);
        assert_eq!(rng.poisson(0.0), 0);
    }

    #[test]
    fn test_uniform_handles_reversed_bounds() {
        let mut rng = RngStream::new(42);
        let v = rng.uniform_f64(2.0, 1.0);
        assert!((1.0..2.0).contains(&v));
    }
}
