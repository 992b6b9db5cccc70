//! 1D intensity profile synthesis.

use crate::error::PatternError;
use crate::geometry::{AxisKind, Geometry};
use crate::peaks::PeakModel;
use crate::strain::StrainTensor;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Options for [`intensity`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct IntensityOptions {
    /// Display axis; q is always valid, the secondary axis must match the
    /// detector mode.
    pub axis: AxisKind,
    /// Background noise level relative to the peak maximum.
    pub background: f64,
    /// Applied strain tensor shifting the peak centers.
    pub strain: StrainTensor,
    /// Azimuthal angle (rad) at which the strain is resolved.
    pub phi: f64,
    /// Noise seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for IntensityOptions {
    fn default() -> Self {
        Self {
            axis: AxisKind::Q,
            background: 0.01,
            strain: StrainTensor::default(),
            phi: 0.0,
            seed: None,
        }
    }
}

/// Synthesized 1D profile: the display axis, one noiseless curve per
/// material and the noisy composite, all normalized by the composite's
/// maximum.
#[derive(Clone, Debug, Serialize)]
pub struct Spectrum {
    pub axis: AxisKind,
    /// Axis sample points (q, 2theta degrees or keV).
    pub x: Vec<f64>,
    /// Per-material curves in registration order.
    pub curves: Vec<(String, Vec<f64>)>,
    /// Composite curve including the background noise; maximum is 1.
    pub total: Vec<f64>,
}

impl Spectrum {
    /// Curve for one material, if registered.
    pub fn curve(&self, name: &str) -> Option<&[f64]> {
        self.curves
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_slice())
    }
}

/// Computes the normalized composite intensity profile over the
/// geometry's q grid. Every material's peaks are shifted by the strain
/// resolved at `phi`; a uniform background in
/// [0, background * max(total)] is added to the composite before the
/// global normalization.
pub fn intensity(
    model: &PeakModel,
    geom: &Geometry,
    opts: &IntensityOptions,
) -> Result<Spectrum, PatternError> {
    geom.mode.check_axis(opts.axis)?;
    if model.is_empty() {
        return Err(PatternError::EmptyModel);
    }

    let strain = opts.strain.resolve(opts.phi);
    let n = geom.q_range.len();

    let mut curves: Vec<(String, Vec<f64>)> = Vec::with_capacity(model.len());
    let mut total = vec![0.0; n];
    for e in model.entries() {
        let curve = crate::strain::strained_gaussians(geom.q_range, &e.a, &e.q0, &e.sigma, strain);
        for (t, &c) in total.iter_mut().zip(&curve) {
            *t += c;
        }
        curves.push((e.name.clone(), curve));
    }

    let max_total = total.iter().cloned().fold(f64::MIN, f64::max);
    if !(max_total > 0.0 && max_total.is_finite()) {
        return Err(PatternError::EmptyModel);
    }

    let mut rng = super::noise_rng(opts.seed);
    let mut noisy: Vec<f64> = total
        .iter()
        .map(|&t| t + opts.background * rng.gen::<f64>() * max_total)
        .collect();

    let norm = noisy.iter().cloned().fold(f64::MIN, f64::max);
    for (_, curve) in &mut curves {
        for v in curve.iter_mut() {
            *v /= norm;
        }
    }
    for v in noisy.iter_mut() {
        *v /= norm;
    }

    Ok(Spectrum {
        axis: opts.axis,
        x: geom.mode.axis_values(geom.q_range, opts.axis),
        curves,
        total: noisy,
    })
}
