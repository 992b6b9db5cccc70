//! Beamline calibration tables for energy-dispersive setups.
//!
//! Each table holds the white-beam energy grid with its relative flux
//! curve, fractional energy-resolution samples and the detector bin
//! count. Consumers never read the raw samples directly; the detector
//! setup wraps them in clamped linear interpolants over q.

use crate::error::PatternError;

/// Calibration data for one energy-dispersive beamline.
#[derive(Clone, Debug)]
pub struct BeamlineInfo {
    pub id: &'static str,
    /// White-beam energy grid (keV), ascending.
    pub energy: Vec<f64>,
    /// Relative flux per energy sample, normalized to a maximum of 1.
    pub flux: Vec<f64>,
    /// Energies (keV) at which the detector resolution was measured.
    pub res_energy: Vec<f64>,
    /// Fractional energy resolution delta_E / E at `res_energy`.
    pub res_delta: Vec<f64>,
    /// Number of detector energy bins.
    pub bins: usize,
}

impl BeamlineInfo {
    /// Upper end of the energy grid (keV).
    pub fn e_max(&self) -> f64 {
        self.energy.last().copied().unwrap_or(0.0)
    }
}

/// Look up the calibration table for a beamline id. Currently only the
/// DLS I12 EDXD instrument is tabulated.
pub fn beamline_info(id: &str) -> Result<BeamlineInfo, PatternError> {
    match id {
        "i12" => Ok(i12()),
        _ => Err(PatternError::UnknownBeamline(id.to_string())),
    }
}

/// DLS I12: wiggler white beam, 20-150 keV, 4096-bin germanium detector.
/// The flux hump and the resolution falloff follow the published
/// instrument envelope.
fn i12() -> BeamlineInfo {
    let energy: Vec<f64> = (0..27).map(|i| 20.0 + 5.0 * i as f64).collect();
    let mut flux: Vec<f64> = energy
        .iter()
        .map(|&e| e * e * (-e / 25.0).exp())
        .collect();
    let peak = flux.iter().cloned().fold(f64::MIN, f64::max);
    for f in &mut flux {
        *f /= peak;
    }

    let res_energy: Vec<f64> = (0..14).map(|i| 20.0 + 10.0 * i as f64).collect();
    let res_delta: Vec<f64> = res_energy.iter().map(|&e| 0.0015 + 0.35 / e).collect();

    BeamlineInfo {
        id: "i12",
        energy,
        flux,
        res_energy,
        res_delta,
        bins: 4096,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i12_table_is_consistent() {
        let info = beamline_info("i12").unwrap();
        assert_eq!(info.energy.len(), info.flux.len());
        assert_eq!(info.res_energy.len(), info.res_delta.len());
        assert_eq!(info.bins, 4096);
        assert!(info.energy.windows(2).all(|w| w[0] < w[1]));
        assert!((info.flux.iter().cloned().fold(f64::MIN, f64::max) - 1.0).abs() < 1e-12);
        assert_eq!(info.e_max(), 150.0);
    }

    #[test]
    fn resolution_improves_with_energy() {
        let info = beamline_info("i12").unwrap();
        assert!(info.res_delta.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn unknown_beamline_is_an_error() {
        assert!(matches!(
            beamline_info("i99"),
            Err(PatternError::UnknownBeamline(_))
        ));
    }
}
