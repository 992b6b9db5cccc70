//! Monochromatic-beam area-detector setup.

use crate::conversions::{e_to_q, q_to_tth};
use crate::error::PatternError;
use crate::geometry::{DetectorMode, Geometry, PixelMaps, ResolutionModel, UnitFlux};
use crate::image::ImageF64;
use crate::peaks::PeakModel;
use crate::synth::{self, IntensityOptions, RingOptions, Spectrum};
use log::debug;
use std::path::Path;

/// Peak width from the beam's energy bandwidth: the q uncertainty of a
/// `delta_energy` spread at the scattering angle where q is reached.
#[derive(Clone, Copy, Debug)]
pub struct EnergyBandwidth {
    pub energy: f64,
    pub delta_energy: f64,
}

impl ResolutionModel for EnergyBandwidth {
    fn sigma_q(&self, q: f64) -> f64 {
        e_to_q(self.delta_energy, q_to_tth(q, self.energy))
    }
}

/// Monochromatic powder-diffraction setup: a flat-panel detector normal
/// to the beam, with peak widths set by the beam's energy bandwidth.
#[derive(Debug)]
pub struct MonoDetector {
    shape: (usize, usize),
    pixel_size: f64,
    sample_to_detector: f64,
    energy: f64,
    maps: PixelMaps,
    q_range: Vec<f64>,
    sigma: EnergyBandwidth,
    flux: UnitFlux,
    model: PeakModel,
}

impl MonoDetector {
    /// Instantiates the setup from the detector dimensions in pixels, the
    /// pixel size (mm), the sample-to-detector distance (mm), the beam
    /// energy (keV) and its bandwidth `delta_energy` (keV).
    pub fn new(
        shape: (usize, usize),
        pixel_size: f64,
        sample_to_detector: f64,
        energy: f64,
        delta_energy: f64,
    ) -> Self {
        let maps = PixelMaps::new(shape, pixel_size, energy, sample_to_detector);
        let q_range = derive_q_range(&maps, pixel_size);
        debug!(
            "mono setup: {}x{} px, q_max={:.3} 1/A, {} q samples",
            shape.0,
            shape.1,
            maps.q_max(),
            q_range.len()
        );
        Self {
            shape,
            pixel_size,
            sample_to_detector,
            energy,
            maps,
            q_range,
            sigma: EnergyBandwidth {
                energy,
                delta_energy,
            },
            flux: UnitFlux,
            model: PeakModel::new(),
        }
    }

    /// The geometry context lent to peak-model operations.
    pub fn geometry(&self) -> Geometry<'_> {
        Geometry {
            mode: DetectorMode::Mono {
                energy: self.energy,
            },
            q_range: &self.q_range,
            sigma_q: &self.sigma,
            flux_q: &self.flux,
        }
    }

    /// Registers a material with default B factor and weight.
    pub fn add_peaks(&mut self, material: &str) -> Result<(), PatternError> {
        self.add_peaks_with(material, 1.0, 1.0)
    }

    /// Registers a material with an explicit Debye-Waller B factor (A^2)
    /// and relative phase weight.
    pub fn add_peaks_with(
        &mut self,
        material: &str,
        b: f64,
        weight: f64,
    ) -> Result<(), PatternError> {
        let geom = Geometry {
            mode: DetectorMode::Mono {
                energy: self.energy,
            },
            q_range: &self.q_range,
            sigma_q: &self.sigma,
            flux_q: &self.flux,
        };
        self.model.add_peaks(material, b, weight, &geom)
    }

    /// Replaces the experimental geometry and recomputes every registered
    /// material's peak set against it. Equivalent to constructing a fresh
    /// setup with the new parameters and re-adding the same materials.
    pub fn new_setup(&mut self, energy: f64, sample_to_detector: f64) -> Result<(), PatternError> {
        self.energy = energy;
        self.sample_to_detector = sample_to_detector;
        self.sigma.energy = energy;
        self.maps = PixelMaps::new(self.shape, self.pixel_size, energy, sample_to_detector);
        self.q_range = derive_q_range(&self.maps, self.pixel_size);
        debug!(
            "new setup: energy={} keV, distance={} mm, q_max={:.3} 1/A",
            energy,
            sample_to_detector,
            self.maps.q_max()
        );
        let geom = Geometry {
            mode: DetectorMode::Mono {
                energy: self.energy,
            },
            q_range: &self.q_range,
            sigma_q: &self.sigma,
            flux_q: &self.flux,
        };
        self.model.recompute(&geom)
    }

    /// Normalized 1D intensity profile; see [`synth::intensity`].
    pub fn intensity(&self, opts: &IntensityOptions) -> Result<Spectrum, PatternError> {
        synth::intensity(&self.model, &self.geometry(), opts)
    }

    /// Per-material relative peak heights; see
    /// [`PeakModel::relative_heights`].
    pub fn relative_heights(&self) -> Result<Vec<(String, Vec<f64>)>, PatternError> {
        self.model.relative_heights()
    }

    /// Debye-Scherrer ring image; see [`synth::rings`].
    pub fn rings(&self, opts: &RingOptions) -> Result<ImageF64, PatternError> {
        synth::rings(&self.model, &self.maps, opts)
    }

    /// Renders the intensity profile with hkl labels to a PNG.
    pub fn plot_intensity(
        &self,
        opts: &IntensityOptions,
        mode: crate::plot::PlotMode,
        exclude_labels: f64,
        path: &Path,
    ) -> Result<(), PatternError> {
        crate::plot::plot_intensity(&self.model, &self.geometry(), opts, mode, exclude_labels, path)
    }

    /// Renders the ring image to a grayscale PNG.
    pub fn plot_rings(&self, opts: &RingOptions, path: &Path) -> Result<(), PatternError> {
        self.rings(opts)?.save_grayscale_png(path)
    }

    /// Renders the normalized intensity-factor curves for a material.
    pub fn plot_intensity_factors(
        &self,
        material: &str,
        b: f64,
        axis: crate::geometry::AxisKind,
        path: &Path,
    ) -> Result<(), PatternError> {
        crate::plot::plot_intensity_factors(material, b, &self.geometry(), axis, path)
    }

    pub fn q_range(&self) -> &[f64] {
        &self.q_range
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn pixel_maps(&self) -> &PixelMaps {
        &self.maps
    }

    pub fn model(&self) -> &PeakModel {
        &self.model
    }
}

/// One q sample per radial pixel between the beam center and the panel
/// corner.
fn derive_q_range(maps: &PixelMaps, pixel_size: f64) -> Vec<f64> {
    let radial_px = (maps.r_max() / pixel_size).round() as usize;
    super::linspace(maps.q_max(), radial_px)
}
