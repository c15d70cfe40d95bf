//! Shared white-noise buffer for noise-based instruments.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Length of the noise buffer in seconds.
pub const NOISE_SECONDS: u32 = 2;

/// Pre-generated uniform noise in [-1, 1].
///
/// Generated once and replayed from the start by every noise voice, so
/// cloning shares the samples rather than re-randomizing.
#[derive(Clone, Debug)]
pub struct NoiseBuffer {
    samples: Arc<[f32]>,
}

impl NoiseBuffer {
    /// Generate a buffer from the thread-local RNG.
    pub fn generate(sample_rate: u32) -> Self {
        Self::generate_with(sample_rate, &mut rand::rng())
    }

    /// Generate a reproducible buffer from a seed.
    pub fn seeded(sample_rate: u32, seed: u64) -> Self {
        Self::generate_with(sample_rate, &mut StdRng::seed_from_u64(seed))
    }

    /// Generate a buffer from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(sample_rate: u32, rng: &mut R) -> Self {
        let len = (sample_rate * NOISE_SECONDS) as usize;
        let samples = (0..len).map(|_| rng.random_range(-1.0f32..=1.0)).collect();
        Self { samples }
    }

    /// The raw samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_seconds_long() {
        let noise = NoiseBuffer::seeded(8000, 1);
        assert_eq!(noise.len(), 16000);
    }

    #[test]
    fn samples_within_unit_range() {
        let noise = NoiseBuffer::seeded(8000, 7);
        assert!(noise.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
        // Not degenerate
        assert!(noise.samples().iter().any(|s| *s > 0.5));
        assert!(noise.samples().iter().any(|s| *s < -0.5));
    }

    #[test]
    fn clones_share_samples() {
        let a = NoiseBuffer::generate(100);
        let b = a.clone();
        assert_eq!(a.samples(), b.samples());
        assert!(std::ptr::eq(a.samples().as_ptr(), b.samples().as_ptr()));
    }

    #[test]
    fn same_seed_same_noise() {
        assert_eq!(
            NoiseBuffer::seeded(1000, 42).samples(),
            NoiseBuffer::seeded(1000, 42).samples()
        );
    }
}
