//! Strain transformation and strained Gaussian peak synthesis.
//!
//! Overview
//! - [`StrainTensor`] holds the in-plane strain components; resolving it
//!   along an azimuthal direction phi gives the fractional peak shift for
//!   that direction.
//! - [`strained_gaussians`] / [`strained_gaussians_image`] evaluate the
//!   composite Gaussian profile over a 1D axis or a 2D pixel grid. The
//!   image path is the hot spot (pixels x peaks evaluations) and runs
//!   row-parallel over contiguous row slices.

use crate::image::ImageF64;
use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// In-plane strain tensor components (e_xx, e_yy, e_xy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrainTensor {
    pub e_xx: f64,
    pub e_yy: f64,
    pub e_xy: f64,
}

impl StrainTensor {
    pub fn new(e_xx: f64, e_yy: f64, e_xy: f64) -> Self {
        Self { e_xx, e_yy, e_xy }
    }

    /// The symmetric 2x2 tensor.
    pub fn matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.e_xx, self.e_xy, self.e_xy, self.e_yy)
    }

    /// Normal strain resolved along the direction phi (rad):
    /// `n^T e n` with `n = (cos phi, sin phi)`, which expands to
    /// `e_xx cos^2 phi + e_yy sin^2 phi + e_xy sin 2 phi`.
    pub fn resolve(&self, phi: f64) -> f64 {
        let n = Vector2::new(phi.cos(), phi.sin());
        (n.transpose() * self.matrix() * n)[(0, 0)]
    }

    /// Per-pixel resolved strain for an azimuthal-angle map.
    pub fn resolve_map(&self, phi: &ImageF64) -> ImageF64 {
        let mut out = ImageF64::new(phi.w, phi.h);
        for (o, &p) in out.data.iter_mut().zip(&phi.data) {
            *o = strain_trans(self.e_xx, self.e_yy, self.e_xy, p);
        }
        out
    }
}

/// Closed-form 2D strain transformation. Equivalent to
/// [`StrainTensor::resolve`]; kept as a free function for the elementwise
/// per-pixel path.
#[inline]
pub fn strain_trans(e_xx: f64, e_yy: f64, e_xy: f64, phi: f64) -> f64 {
    let c = phi.cos();
    let s = phi.sin();
    e_xx * c * c + e_yy * s * s + e_xy * (2.0 * phi).sin()
}

/// Sum of strained Gaussian peaks over a 1D axis:
/// `sum_k a_k exp(-((x - q0_k (1 + strain))^2) / (2 sigma_k^2))`.
///
/// The peak apex of an isolated peak equals its stored height `a_k`.
pub fn strained_gaussians(
    x: &[f64],
    a: &[f64],
    q0: &[f64],
    sigma: &[f64],
    strain: f64,
) -> Vec<f64> {
    debug_assert!(a.len() == q0.len() && q0.len() == sigma.len());
    let mut out = vec![0.0; x.len()];
    for ((&ak, &q0k), &sk) in a.iter().zip(q0).zip(sigma) {
        let center = q0k * (1.0 + strain);
        let inv_two_sigma_sq = 0.5 / (sk * sk);
        for (o, &xi) in out.iter_mut().zip(x) {
            let d = xi - center;
            *o += ak * (-d * d * inv_two_sigma_sq).exp();
        }
    }
    out
}

/// Sum of strained Gaussian peaks over a 2D pixel grid, with a per-pixel
/// strain map. `q` and `strain` must have identical shapes. Rows are
/// processed in parallel.
pub fn strained_gaussians_image(
    q: &ImageF64,
    strain: &ImageF64,
    a: &[f64],
    q0: &[f64],
    sigma: &[f64],
) -> ImageF64 {
    debug_assert!(a.len() == q0.len() && q0.len() == sigma.len());
    assert_eq!((q.w, q.h), (strain.w, strain.h), "map shape mismatch");

    let inv: Vec<f64> = sigma.iter().map(|&s| 0.5 / (s * s)).collect();
    let mut out = ImageF64::new(q.w, q.h);
    out.data
        .par_chunks_mut(q.stride)
        .zip(q.data.par_chunks(q.stride).zip(strain.data.par_chunks(strain.stride)))
        .for_each(|(orow, (qrow, srow))| {
            for ((o, &qx), &st) in orow.iter_mut().zip(qrow).zip(srow) {
                let mut acc = 0.0;
                for k in 0..a.len() {
                    let d = qx - q0[k] * (1.0 + st);
                    acc += a[k] * (-d * d * inv[k]).exp();
                }
                *o = acc;
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_principal_directions() {
        let e = StrainTensor::new(0.2, 0.1, 0.05);
        assert!((e.resolve(0.0) - 0.2).abs() < 1e-12);
        assert!((e.resolve(std::f64::consts::FRAC_PI_2) - 0.1).abs() < 1e-12);
        // At 45 degrees the shear term contributes fully.
        let expected = 0.5 * (0.2 + 0.1) + 0.05;
        assert!((e.resolve(std::f64::consts::FRAC_PI_4) - expected).abs() < 1e-12);
    }

    #[test]
    fn closed_form_matches_tensor_contraction() {
        let e = StrainTensor::new(-0.03, 0.07, 0.02);
        for i in 0..16 {
            let phi = i as f64 * 0.4;
            let closed = strain_trans(e.e_xx, e.e_yy, e.e_xy, phi);
            assert!((closed - e.resolve(phi)).abs() < 1e-12);
        }
    }

    #[test]
    fn unstrained_apex_equals_height() {
        let x = [1.0, 2.0, 3.0];
        let y = strained_gaussians(&x, &[4.0], &[2.0], &[0.1], 0.0);
        assert!((y[1] - 4.0).abs() < 1e-12);
        assert!(y[0] < 1e-8 && y[2] < 1e-8);
    }

    #[test]
    fn strain_shifts_the_peak_center() {
        let q0 = 2.0;
        let strain = 0.01;
        let x = [q0 * (1.0 + strain)];
        let y = strained_gaussians(&x, &[1.0], &[q0], &[0.05], strain);
        assert!((y[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn image_path_matches_scalar_path() {
        let a = [1.0, 0.5];
        let q0 = [2.0, 3.0];
        let sigma = [0.05, 0.08];
        let q = ImageF64::from_fn(4, 3, |x, y| 1.5 + 0.3 * (x + y) as f64);
        let strain = ImageF64::from_fn(4, 3, |x, _| 0.001 * x as f64);

        let img = strained_gaussians_image(&q, &strain, &a, &q0, &sigma);
        for y in 0..3 {
            for x in 0..4 {
                let scalar =
                    strained_gaussians(&[q.get(x, y)], &a, &q0, &sigma, strain.get(x, y));
                assert!((img.get(x, y) - scalar[0]).abs() < 1e-12);
            }
        }
    }
}
