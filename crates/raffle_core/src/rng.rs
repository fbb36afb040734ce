// crates/raffle_core/src/rng.rs
//
// Uniform random index sources for the draw engine.
// Focus: unbiased inclusive ranges, explicit seeding, swappable implementations.
//
// • `IndexSource` is the only randomness the engine ever sees.
// • `ChaChaIndexSource` is integer-only: no floating point, unbiased ranges via
//   rejection sampling, explicit u64 → 32-byte seed mapping.
// • `ScriptedIndexSource` replays a fixed sequence so draw outcomes are reproducible.
// • `SharedIndexSource` serializes access to one generator across threads.

use alloc::vec::Vec;

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Uniform integer in the inclusive range `[min, max]`.
///
/// Implementations never fail and never block. Reversed bounds are swapped.
pub trait IndexSource {
    fn next_in(&mut self, min: usize, max: usize) -> usize;
}

impl<S: IndexSource + ?Sized> IndexSource for &mut S {
    #[inline]
    fn next_in(&mut self, min: usize, max: usize) -> usize {
        (**self).next_in(min, max)
    }
}

#[cfg(feature = "std")]
impl<S: IndexSource + ?Sized> IndexSource for std::boxed::Box<S> {
    #[inline]
    fn next_in(&mut self, min: usize, max: usize) -> usize {
        (**self).next_in(min, max)
    }
}

#[inline]
fn ordered(min: usize, max: usize) -> (usize, usize) {
    if min <= max { (min, max) } else { (max, min) }
}

/* ---------------------------- ChaChaIndexSource ---------------------------- */

/// ChaCha20-backed source.
///
/// Seeding from a `u64` is explicit: `seed.to_le_bytes()` fills the first 8
/// bytes of the 32-byte ChaCha seed and the remaining 24 bytes are zero. This
/// keeps the stream stable across platforms for a given seed.
#[derive(Debug, Clone)]
pub struct ChaChaIndexSource {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl ChaChaIndexSource {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    /// Production source seeded from OS entropy.
    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            words_consumed: 0,
        }
    }

    /// Number of 64-bit words drawn so far (rejected words included).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in `[0, n)`; `None` if `n == 0`.
    ///
    /// `threshold = 2^64 mod n`; accept `x >= threshold`, then `x % n` is uniform.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }
}

impl IndexSource for ChaChaIndexSource {
    fn next_in(&mut self, min: usize, max: usize) -> usize {
        let (lo, hi) = ordered(min, max);
        let span = (hi - lo) as u64;
        let offset = if span == u64::MAX {
            self.next_u64()
        } else {
            match self.gen_range(span + 1) {
                Some(v) => v,
                None => unreachable!("gen_range(>0) must return Some"),
            }
        };
        lo + offset as usize
    }
}

/* --------------------------- ScriptedIndexSource --------------------------- */

/// Replays a fixed sequence of values, cycling when exhausted.
///
/// Each value is clamped into the requested range. An empty script yields the
/// lower bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIndexSource {
    script: Vec<usize>,
    calls: usize,
}

impl ScriptedIndexSource {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self { script: script.into_iter().collect(), calls: 0 }
    }

    /// How many times `next_in` has been called.
    #[inline]
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl IndexSource for ScriptedIndexSource {
    fn next_in(&mut self, min: usize, max: usize) -> usize {
        let (lo, hi) = ordered(min, max);
        let raw = if self.script.is_empty() {
            lo
        } else {
            self.script[self.calls % self.script.len()]
        };
        self.calls += 1;
        raw.clamp(lo, hi)
    }
}

/* ---------------------------- SharedIndexSource ---------------------------- */

/// One generator shared across threads; each `next_in` holds the lock.
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct SharedIndexSource<S> {
    inner: std::sync::Arc<std::sync::Mutex<S>>,
}

#[cfg(feature = "std")]
impl<S> Clone for SharedIndexSource<S> {
    fn clone(&self) -> Self {
        Self { inner: std::sync::Arc::clone(&self.inner) }
    }
}

#[cfg(feature = "std")]
impl<S: IndexSource> SharedIndexSource<S> {
    pub fn new(source: S) -> Self {
        Self { inner: std::sync::Arc::new(std::sync::Mutex::new(source)) }
    }

    /// Run `f` with exclusive access to the wrapped source.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        // A panic in another holder leaves the generator state intact.
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(feature = "std")]
impl<S: IndexSource> IndexSource for SharedIndexSource<S> {
    fn next_in(&mut self, min: usize, max: usize) -> usize {
        self.with(|s| s.next_in(min, max))
    }
}

// ------------------------------
// Tests (determinism & basics)
// ------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_range_zero_none() {
        let mut rng = ChaChaIndexSource::from_seed_u64(0xDEADBEEFCAFEBABE);
        assert_eq!(rng.gen_range(0), None);
        assert_eq!(rng.words_consumed(), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ChaChaIndexSource::from_seed_u64(123456789);
        let mut b = ChaChaIndexSource::from_seed_u64(123456789);
        let seq_a: Vec<usize> = (0..32).map(|_| a.next_in(1, 10)).collect();
        let seq_b: Vec<usize> = (0..32).map(|_| b.next_in(1, 10)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn next_in_stays_inclusive() {
        let mut rng = ChaChaIndexSource::from_seed_u64(7);
        let mut seen = [false; 3];
        for _ in 0..500 {
            let v = rng.next_in(4, 6);
            assert!((4..=6).contains(&v));
            seen[v - 4] = true;
        }
        assert!(seen.iter().all(|s| *s), "every value in a small range shows up");
        assert_eq!(rng.next_in(9, 9), 9);
        assert!((2..=5).contains(&rng.next_in(5, 2)));
    }

    #[test]
    fn next_in_full_range_does_not_overflow() {
        let mut rng = ChaChaIndexSource::from_seed_u64(1);
        let _ = rng.next_in(0, usize::MAX);
        assert!(rng.words_consumed() >= 1);
    }

    #[test]
    fn scripted_replays_clamps_and_cycles() {
        let mut s = ScriptedIndexSource::new([3, 1, 99]);
        assert_eq!(s.next_in(1, 5), 3);
        assert_eq!(s.next_in(1, 4), 1);
        assert_eq!(s.next_in(1, 3), 3);
        assert_eq!(s.next_in(1, 5), 3);
        assert_eq!(s.calls(), 4);

        let mut empty = ScriptedIndexSource::default();
        assert_eq!(empty.next_in(2, 8), 2);
    }

    #[cfg(feature = "std")]
    #[test]
    fn shared_source_serializes_one_stream() {
        let shared = SharedIndexSource::new(ScriptedIndexSource::new([1, 2, 3]));
        let mut a = shared.clone();
        let mut b = shared.clone();
        assert_eq!(a.next_in(1, 3), 1);
        assert_eq!(b.next_in(1, 3), 2);
        assert_eq!(a.next_in(1, 3), 3);
        assert_eq!(shared.with(|s| s.calls()), 3);
    }

    #[cfg(feature = "std")]
    #[test]
    fn shared_source_across_threads() {
        let shared = SharedIndexSource::new(ChaChaIndexSource::from_seed_u64(42));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut s = shared.clone();
                std::thread::spawn(move || (0..25).map(|_| s.next_in(1, 6)).collect::<Vec<_>>())
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap().len()).sum();
        assert_eq!(total, 100);
        assert!(shared.with(|s| s.words_consumed()) >= 100);
    }
}
