//! Detector geometry: display axes, mode dispatch, per-pixel maps and the
//! borrowed context handed to the peak model.
//!
//! Design
//! - [`DetectorMode`] is a tagged variant (monochromatic beam vs fixed-angle
//!   energy-dispersive) owning axis validation and the q -> display-axis
//!   conversion, so mode behaviour never hinges on string comparisons.
//! - Peak width and flux are strategy traits ([`ResolutionModel`],
//!   [`FluxModel`]) implemented per detector variant.
//! - [`Geometry`] borrows everything from the owning detector setup; the
//!   peak model never duplicates the q grid or the strategies.

use crate::conversions::{q_to_e, q_to_tth};
use crate::error::PatternError;
use crate::image::ImageF64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display axis for spectra and factor curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    /// Momentum transfer (1/A), valid in every mode.
    #[default]
    Q,
    /// Scattering angle in degrees, monochromatic mode only.
    TwoTheta,
    /// Photon energy in keV, energy-dispersive mode only.
    Energy,
}

impl AxisKind {
    /// Axis label for plots.
    pub fn label(&self) -> &'static str {
        match self {
            AxisKind::Q => "q (1/A)",
            AxisKind::TwoTheta => "2theta (deg)",
            AxisKind::Energy => "energy (keV)",
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisKind::Q => "q",
            AxisKind::TwoTheta => "2theta",
            AxisKind::Energy => "energy",
        };
        f.write_str(name)
    }
}

/// Detector mode tag carrying the beam parameter that fixes the
/// q <-> secondary-axis relation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DetectorMode {
    /// Monochromatic beam of the given energy (keV); the secondary axis is
    /// the scattering angle.
    Mono { energy: f64 },
    /// Energy-dispersive setup at a fixed scattering angle (rad); the
    /// secondary axis is photon energy.
    Edxd { two_theta: f64 },
}

impl DetectorMode {
    /// Human-readable mode name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            DetectorMode::Mono { .. } => "monochromatic",
            DetectorMode::Edxd { .. } => "energy-dispersive",
        }
    }

    /// The mode-specific secondary axis.
    pub fn secondary_axis(&self) -> AxisKind {
        match self {
            DetectorMode::Mono { .. } => AxisKind::TwoTheta,
            DetectorMode::Edxd { .. } => AxisKind::Energy,
        }
    }

    /// Validate a requested display axis against the mode.
    pub fn check_axis(&self, axis: AxisKind) -> Result<(), PatternError> {
        if axis == AxisKind::Q || axis == self.secondary_axis() {
            Ok(())
        } else {
            Err(PatternError::AxisMode {
                axis,
                mode: self.name(),
            })
        }
    }

    /// Convert a q value (1/A) to the mode's secondary axis: degrees of
    /// 2theta for monochromatic, keV for energy-dispersive.
    pub fn convert(&self, q: f64) -> f64 {
        match *self {
            DetectorMode::Mono { energy } => q_to_tth(q, energy).to_degrees(),
            DetectorMode::Edxd { two_theta } => q_to_e(q, two_theta),
        }
    }

    /// Map q values onto the requested axis. The axis must already have
    /// been validated.
    pub fn axis_values(&self, q: &[f64], axis: AxisKind) -> Vec<f64> {
        match axis {
            AxisKind::Q => q.to_vec(),
            _ => q.iter().map(|&qi| self.convert(qi)).collect(),
        }
    }
}

/// Peak-width strategy: Gaussian sigma (in q) at a peak center.
pub trait ResolutionModel {
    fn sigma_q(&self, q: f64) -> f64;
}

/// Incident-flux strategy: relative flux reaching the reflection at q.
pub trait FluxModel {
    fn flux_q(&self, q: f64) -> f64;
}

/// Flat unit flux, used by monochromatic setups.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitFlux;

impl FluxModel for UnitFlux {
    fn flux_q(&self, _q: f64) -> f64 {
        1.0
    }
}

/// Geometry context borrowed from a detector setup for the duration of a
/// peak-model call. The setup remains the sole owner of the q grid and
/// the width/flux strategies.
#[derive(Clone, Copy)]
pub struct Geometry<'a> {
    pub mode: DetectorMode,
    /// Ascending q sample points starting at 0.
    pub q_range: &'a [f64],
    pub sigma_q: &'a dyn ResolutionModel,
    pub flux_q: &'a dyn FluxModel,
}

impl Geometry<'_> {
    /// Upper end of the q grid.
    pub fn q_max(&self) -> f64 {
        self.q_range.last().copied().unwrap_or(0.0)
    }
}

/// Per-pixel maps of a flat-panel area detector: radius from the beam
/// center (mm), momentum transfer (1/A) and azimuthal angle (rad).
#[derive(Clone, Debug)]
pub struct PixelMaps {
    pub shape: (usize, usize),
    pub r: ImageF64,
    pub q: ImageF64,
    pub phi: ImageF64,
}

impl PixelMaps {
    /// Build the maps for a detector of `shape` (columns, rows) with
    /// square pixels of `pixel_size` (mm), a beam energy (keV) and a
    /// sample-to-detector distance (mm). The beam center sits at the
    /// geometric center of the panel.
    pub fn new(shape: (usize, usize), pixel_size: f64, energy: f64, distance: f64) -> Self {
        let (w, h) = shape;
        let cx = (w as f64 - 1.0) / 2.0;
        let cy = (h as f64 - 1.0) / 2.0;
        let r = ImageF64::from_fn(w, h, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            dx.hypot(dy) * pixel_size
        });
        let q = ImageF64::from_fn(w, h, |x, y| {
            let tth = (r.get(x, y) / distance).atan();
            crate::conversions::e_to_q(energy, tth)
        });
        let phi = ImageF64::from_fn(w, h, |x, y| {
            (y as f64 - cy).atan2(x as f64 - cx)
        });
        Self { shape, r, q, phi }
    }

    /// Maximum radial distance on the panel (mm).
    pub fn r_max(&self) -> f64 {
        self.r.nanmax().unwrap_or(0.0)
    }

    /// Maximum momentum transfer reached by any pixel (1/A).
    pub fn q_max(&self) -> f64 {
        self.q.nanmax().unwrap_or(0.0)
    }

    /// Symmetric fractional crop of the q and phi maps: `frac` of each
    /// dimension is removed, half per edge. `frac == 0` returns full
    /// copies; fractions outside [0, 1) would leave no pixels on some
    /// panel sizes and are rejected uniformly.
    pub fn cropped_q_phi(&self, frac: f64) -> Result<(ImageF64, ImageF64), PatternError> {
        if !(0.0..1.0).contains(&frac) {
            return Err(PatternError::Crop(frac));
        }
        let (w, h) = self.shape;
        let left = (frac * w as f64 / 2.0) as usize;
        let top = (frac * h as f64 / 2.0) as usize;
        if left == 0 && top == 0 {
            return Ok((self.q.clone(), self.phi.clone()));
        }
        Ok((
            self.q.crop_borders(top, left),
            self.phi.crop_borders(top, left),
        ))
    }
}
