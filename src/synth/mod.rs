//! Spectrum and ring synthesis from the accumulated peak registry.
//!
//! Both synthesizers consume a [`crate::peaks::PeakModel`] plus the owning
//! setup's geometry and add a uniform random background whose seed is
//! injectable for reproducible tests.

pub mod rings;
pub mod spectrum;

pub use rings::{rings, RingOptions};
pub use spectrum::{intensity, IntensityOptions, Spectrum};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Background-noise source: seeded for reproducibility, entropy otherwise.
pub(crate) fn noise_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
