//! Physical intensity factors weighting each reflection.
//!
//! Four factors enter a peak's integrated intensity: the atomic
//! scattering factor, the Debye-Waller temperature factor, the
//! Lorentz-polarization correction (monochromatic geometry only) and the
//! incident flux at the reflection's q (energy-dispersive only). The
//! numeric path below has no side effects; visualisation lives in
//! [`crate::plot`].

use crate::conversions::q_to_tth;
use crate::error::PatternError;
use crate::geometry::{DetectorMode, Geometry};
use crate::materials;
use std::f64::consts::PI;

/// The four factor curves evaluated over a common q grid.
#[derive(Clone, Debug)]
pub struct IntensityFactors {
    /// Lorentz-polarization correction (1.0 in energy-dispersive mode).
    pub lp: Vec<f64>,
    /// Atomic scattering factor f0(q).
    pub sf: Vec<f64>,
    /// Debye-Waller temperature damping.
    pub tf: Vec<f64>,
    /// Relative incident flux (1.0 in monochromatic mode).
    pub flux: Vec<f64>,
}

impl IntensityFactors {
    /// Combined relative weighting curve `sf^2 * lp * tf * flux`, used by
    /// the factor plots.
    pub fn combined(&self) -> Vec<f64> {
        self.sf
            .iter()
            .zip(&self.lp)
            .zip(&self.tf)
            .zip(&self.flux)
            .map(|(((&sf, &lp), &tf), &flux)| sf * sf * lp * tf * flux)
            .collect()
    }
}

/// Atomic scattering factor of `material` at each q (1/A).
pub fn scattering_factor(material: &str, q: &[f64]) -> Result<Vec<f64>, PatternError> {
    let ff = materials::form_factor(material)
        .ok_or_else(|| PatternError::UnknownMaterial(material.to_string()))?;
    Ok(q.iter().map(|&qi| ff.at_q(qi)).collect())
}

/// Debye-Waller intensity damping `exp(-2 B (q / 4 pi)^2)` for a B factor
/// in A^2. Monotonically decreasing in |q|.
pub fn temperature_factor(q: &[f64], b: f64) -> Vec<f64> {
    q.iter()
        .map(|&qi| {
            let s = qi / (4.0 * PI);
            (-2.0 * b * s * s).exp()
        })
        .collect()
}

/// Lorentz-polarization correction for an unpolarized monochromatic beam
/// at scattering angle `two_theta` (rad). Diverges as the angle
/// approaches zero; callers only evaluate it at reflection positions.
pub fn lp_factor(two_theta: f64) -> f64 {
    let theta = two_theta / 2.0;
    let sin_t = theta.sin();
    let cos_t = theta.cos();
    let cos_2t = two_theta.cos();
    (1.0 + cos_2t * cos_2t) / (8.0 * sin_t * sin_t * cos_t)
}

/// Evaluates the four factors for `material` with B factor `b` at the
/// given q values under the supplied geometry.
pub fn intensity_factors(
    material: &str,
    b: f64,
    q: &[f64],
    geom: &Geometry,
) -> Result<IntensityFactors, PatternError> {
    let lp = match geom.mode {
        DetectorMode::Mono { energy } => {
            q.iter().map(|&qi| lp_factor(q_to_tth(qi, energy))).collect()
        }
        DetectorMode::Edxd { .. } => vec![1.0; q.len()],
    };
    let sf = scattering_factor(material, q)?;
    let tf = temperature_factor(q, b);
    let flux = match geom.mode {
        DetectorMode::Mono { .. } => vec![1.0; q.len()],
        DetectorMode::Edxd { .. } => q.iter().map(|&qi| geom.flux_q.flux_q(qi)).collect(),
    };
    Ok(IntensityFactors { lp, sf, tf, flux })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ResolutionModel, UnitFlux};

    struct FixedSigma(f64);
    impl ResolutionModel for FixedSigma {
        fn sigma_q(&self, _q: f64) -> f64 {
            self.0
        }
    }

    fn mono_geometry(q_range: &[f64]) -> Geometry<'_> {
        static FLUX: UnitFlux = UnitFlux;
        static SIGMA: FixedSigma = FixedSigma(0.05);
        Geometry {
            mode: DetectorMode::Mono { energy: 100.0 },
            q_range,
            sigma_q: &SIGMA,
            flux_q: &FLUX,
        }
    }

    #[test]
    fn temperature_factor_decreases_with_q() {
        let q: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let tf = temperature_factor(&q, 1.0);
        assert_eq!(tf[0], 1.0);
        assert!(tf.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn lp_factor_is_positive_at_reflection_angles() {
        for &tth in &[0.02, 0.1, 0.5, 1.5] {
            assert!(lp_factor(tth) > 0.0);
        }
    }

    #[test]
    fn mono_mode_has_unit_flux_and_real_lp() {
        let q = [2.0, 3.0, 4.0];
        let geom = mono_geometry(&q);
        let f = intensity_factors("Al", 1.0, &q, &geom).unwrap();
        assert!(f.flux.iter().all(|&v| v == 1.0));
        assert!(f.lp.iter().all(|&v| v > 0.0 && v.is_finite()));
        assert_eq!(f.sf.len(), q.len());
    }

    #[test]
    fn unknown_material_propagates() {
        let q = [2.0];
        let geom = mono_geometry(&q);
        assert!(matches!(
            intensity_factors("Xx", 1.0, &q, &geom),
            Err(PatternError::UnknownMaterial(_))
        ));
    }
}
