//! 2D Debye-Scherrer ring synthesis.
//!
//! Rasterizes the flattened peak set onto the detector's per-pixel q and
//! azimuth maps. Weak reflections can be dropped before the per-pixel
//! pass (each surviving peak costs one Gaussian evaluation per pixel) and
//! the panel can be cropped symmetrically, both of which keep large
//! detectors tractable.

use crate::error::PatternError;
use crate::geometry::PixelMaps;
use crate::image::ImageF64;
use crate::peaks::PeakModel;
use crate::strain::{strained_gaussians_image, StrainTensor};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Options for [`rings`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RingOptions {
    /// Drop peaks whose height falls below this fraction of the global
    /// maximum peak height.
    pub exclude_criteria: f64,
    /// Fraction of each detector dimension to crop away (half per edge).
    pub crop: f64,
    /// Uniform background noise level added per pixel.
    pub background: f64,
    /// Applied strain tensor, resolved per pixel against the azimuth map.
    pub strain: StrainTensor,
    /// Noise seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for RingOptions {
    fn default() -> Self {
        Self {
            exclude_criteria: 0.01,
            crop: 0.0,
            background: 0.02,
            strain: StrainTensor::default(),
            seed: None,
        }
    }
}

/// Synthesizes the Debye-Scherrer ring image for the registered peak set.
/// The result is normalized to [0, 1] with a NaN-safe maximum of exactly 1.
pub fn rings(
    model: &PeakModel,
    maps: &PixelMaps,
    opts: &RingOptions,
) -> Result<ImageF64, PatternError> {
    // Pre-exclusion normalization reference; also rejects empty models.
    let a_max = model.max_height()?;

    let (q, phi) = maps.cropped_q_phi(opts.crop)?;
    let strain_map = opts.strain.resolve_map(&phi);

    let flat = model.flattened();
    let threshold = opts.exclude_criteria * a_max;
    let mut q0 = Vec::with_capacity(flat.q0.len());
    let mut a = Vec::with_capacity(flat.a.len());
    let mut sigma = Vec::with_capacity(flat.sigma.len());
    for i in 0..flat.q0.len() {
        if flat.a[i] > threshold {
            q0.push(flat.q0[i]);
            a.push(flat.a[i]);
            sigma.push(flat.sigma[i]);
        }
    }
    debug!(
        "ring synthesis: {} of {} peaks over {}x{} px",
        q0.len(),
        flat.q0.len(),
        q.w,
        q.h
    );

    let mut img = strained_gaussians_image(&q, &strain_map, &a, &q0, &sigma);
    for v in img.data.iter_mut() {
        *v /= a_max;
    }

    let mut rng = super::noise_rng(opts.seed);
    for v in img.data.iter_mut() {
        *v += rng.gen::<f64>() * opts.background;
    }

    let max = img
        .nanmax()
        .filter(|m| *m > 0.0 && m.is_finite())
        .ok_or(PatternError::EmptyModel)?;
    for v in img.data.iter_mut() {
        *v /= max;
    }
    Ok(img)
}
