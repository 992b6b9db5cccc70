//! Conversions between momentum transfer, photon energy and scattering
//! angle.
//!
//! All functions are pure and use keV for energy, inverse Angstroms for q
//! and radians for the scattering angle `2theta`. The elastic-scattering
//! relation is `q = (4 pi / lambda) sin(theta)` with
//! `lambda = hc / E`.

/// hc in keV * Angstrom.
pub const HC_KEV_ANGSTROM: f64 = 12.398_419_8;

const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Momentum transfer (1/A) for a photon energy (keV) scattered through
/// `two_theta` (rad).
#[inline]
pub fn e_to_q(energy: f64, two_theta: f64) -> f64 {
    energy * FOUR_PI * (two_theta / 2.0).sin() / HC_KEV_ANGSTROM
}

/// Photon energy (keV) diffracting at momentum transfer `q` (1/A) for a
/// fixed scattering angle `two_theta` (rad).
#[inline]
pub fn q_to_e(q: f64, two_theta: f64) -> f64 {
    let s = (two_theta / 2.0).sin();
    if s == 0.0 {
        return 0.0;
    }
    q * HC_KEV_ANGSTROM / (FOUR_PI * s)
}

/// Scattering angle `2theta` (rad) at which `q` (1/A) is reached for a
/// beam energy (keV). The asin argument is clamped so q values slightly
/// beyond the back-scattering limit saturate instead of producing NaN.
#[inline]
pub fn q_to_tth(q: f64, energy: f64) -> f64 {
    let arg = (q * HC_KEV_ANGSTROM / (FOUR_PI * energy)).clamp(-1.0, 1.0);
    2.0 * arg.asin()
}

/// Momentum transfer (1/A) at scattering angle `two_theta` (rad) for a
/// beam energy (keV). Inverse of [`q_to_tth`].
#[inline]
pub fn tth_to_q(two_theta: f64, energy: f64) -> f64 {
    e_to_q(energy, two_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn energy_q_round_trip() {
        let tth = 0.12;
        for &e in &[10.0, 50.0, 150.0] {
            let q = e_to_q(e, tth);
            assert!((q_to_e(q, tth) - e).abs() < TOL * e);
        }
    }

    #[test]
    fn angle_q_round_trip() {
        let energy = 100.0;
        for &q in &[0.5, 2.0, 8.0] {
            let tth = q_to_tth(q, energy);
            assert!((tth_to_q(tth, energy) - q).abs() < TOL * q);
        }
    }

    #[test]
    fn zero_q_maps_to_zero_angle() {
        assert_eq!(q_to_tth(0.0, 80.0), 0.0);
        assert_eq!(e_to_q(80.0, 0.0), 0.0);
    }

    #[test]
    fn asin_argument_is_clamped() {
        // q beyond the back-scattering limit saturates at 2theta = pi.
        let tth = q_to_tth(1e4, 10.0);
        assert!((tth - std::f64::consts::PI).abs() < 1e-12);
    }
}
