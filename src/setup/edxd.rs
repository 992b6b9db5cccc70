//! Energy-dispersive (fixed-angle) detector setup.

use crate::beamline::{self, BeamlineInfo};
use crate::conversions::e_to_q;
use crate::error::PatternError;
use crate::geometry::{AxisKind, DetectorMode, FluxModel, Geometry, ResolutionModel};
use crate::image::ImageF64;
use crate::interp::Interp1d;
use crate::peaks::PeakModel;
use crate::synth::{self, IntensityOptions, RingOptions, Spectrum};
use log::debug;
use std::path::Path;

/// Peak width from the beamline's tabulated detector resolution,
/// converted to q at the fixed scattering angle.
#[derive(Clone, Debug)]
pub struct TabulatedResolution(Interp1d);

impl ResolutionModel for TabulatedResolution {
    fn sigma_q(&self, q: f64) -> f64 {
        self.0.eval(q)
    }
}

/// Relative incident flux from the beamline's white-beam spectrum,
/// converted to q at the fixed scattering angle.
#[derive(Clone, Debug)]
pub struct TabulatedFlux(Interp1d);

impl FluxModel for TabulatedFlux {
    fn flux_q(&self, q: f64) -> f64 {
        self.0.eval(q)
    }
}

/// Energy-dispersive powder-diffraction setup: a point detector at a
/// fixed scattering angle resolving the diffracted white beam by photon
/// energy. There is no area detector, so ring synthesis is unavailable.
#[derive(Debug)]
pub struct EnergyDetector {
    two_theta: f64,
    beamline: &'static str,
    q_range: Vec<f64>,
    sigma: TabulatedResolution,
    flux: TabulatedFlux,
    model: PeakModel,
}

impl EnergyDetector {
    /// Instantiates the setup from the scattering angle `two_theta` (rad)
    /// and a beamline id resolving to a calibration table.
    pub fn new(two_theta: f64, beamline: &str) -> Result<Self, PatternError> {
        if two_theta <= 0.0 || two_theta.is_nan() {
            return Err(PatternError::Angle(two_theta));
        }
        let info = beamline::beamline_info(beamline)?;
        let (sigma, flux) = build_response(&info, two_theta);
        let q_max = e_to_q(info.e_max(), two_theta);
        let q_range = super::linspace(q_max, info.bins);
        debug!(
            "edxd setup: {} at 2theta={:.4} rad, q_max={:.3} 1/A, {} bins",
            info.id, two_theta, q_max, info.bins
        );
        Ok(Self {
            two_theta,
            beamline: info.id,
            q_range,
            sigma,
            flux,
            model: PeakModel::new(),
        })
    }

    /// The geometry context lent to peak-model operations.
    pub fn geometry(&self) -> Geometry<'_> {
        Geometry {
            mode: DetectorMode::Edxd {
                two_theta: self.two_theta,
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
            mode: DetectorMode::Edxd {
                two_theta: self.two_theta,
            },
            q_range: &self.q_range,
            sigma_q: &self.sigma,
            flux_q: &self.flux,
        };
        self.model.add_peaks(material, b, weight, &geom)
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

    /// Ring synthesis needs an area detector; this variant has none.
    pub fn rings(&self, _opts: &RingOptions) -> Result<ImageF64, PatternError> {
        Err(PatternError::NotSupported(
            "ring synthesis requires an area detector (monochromatic setup)",
        ))
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

    /// Renders the normalized intensity-factor curves for a material.
    pub fn plot_intensity_factors(
        &self,
        material: &str,
        b: f64,
        axis: AxisKind,
        path: &Path,
    ) -> Result<(), PatternError> {
        crate::plot::plot_intensity_factors(material, b, &self.geometry(), axis, path)
    }

    pub fn q_range(&self) -> &[f64] {
        &self.q_range
    }

    pub fn two_theta(&self) -> f64 {
        self.two_theta
    }

    pub fn beamline(&self) -> &'static str {
        self.beamline
    }

    pub fn model(&self) -> &PeakModel {
        &self.model
    }
}

/// Builds the q-domain resolution and flux interpolants from a beamline
/// table at the given scattering angle.
fn build_response(info: &BeamlineInfo, two_theta: f64) -> (TabulatedResolution, TabulatedFlux) {
    let res_q: Vec<f64> = info
        .res_energy
        .iter()
        .map(|&e| e_to_q(e, two_theta))
        .collect();
    let res_sigma: Vec<f64> = info
        .res_energy
        .iter()
        .zip(&info.res_delta)
        .map(|(&e, &frac)| e_to_q(e * frac, two_theta))
        .collect();
    let flux_q: Vec<f64> = info
        .energy
        .iter()
        .map(|&e| e_to_q(e, two_theta))
        .collect();
    (
        TabulatedResolution(Interp1d::new(res_q, res_sigma)),
        TabulatedFlux(Interp1d::new(flux_q, info.flux.clone())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn q_range_spans_the_beamline_energy_window() {
        let det = EnergyDetector::new(PI / 36.0, "i12").unwrap();
        let q = det.q_range();
        assert_eq!(q.len(), 4096);
        assert_eq!(q[0], 0.0);
        let expected_max = e_to_q(150.0, PI / 36.0);
        assert!((q.last().unwrap() - expected_max).abs() < 1e-12);
    }

    #[test]
    fn response_clamps_below_the_table() {
        let det = EnergyDetector::new(PI / 36.0, "i12").unwrap();
        // q below the lowest tabulated sample clamps to the boundary.
        let low = det.sigma.sigma_q(0.0);
        let lowest_sample = det.sigma.sigma_q(e_to_q(20.0, PI / 36.0));
        assert_eq!(low, lowest_sample);
        assert!(low > 0.0);
    }

    #[test]
    fn unknown_beamline_fails_construction() {
        assert!(matches!(
            EnergyDetector::new(PI / 36.0, "b16"),
            Err(PatternError::UnknownBeamline(_))
        ));
    }

    #[test]
    fn non_positive_angle_fails_construction() {
        for tth in [0.0, -0.1, f64::NAN] {
            assert!(matches!(
                EnergyDetector::new(tth, "i12"),
                Err(PatternError::Angle(_))
            ));
        }
    }

    #[test]
    fn rings_are_not_supported() {
        let det = EnergyDetector::new(PI / 36.0, "i12").unwrap();
        assert!(matches!(
            det.rings(&RingOptions::default()),
            Err(PatternError::NotSupported(_))
        ));
    }
}
