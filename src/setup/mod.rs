//! Detector setups binding an experimental geometry to the peak model.
//!
//! [`MonoDetector`] is a monochromatic-beam area detector;
//! [`EnergyDetector`] is a fixed-angle energy-dispersive point detector.
//! Each variant owns its q grid and the width/flux strategies and lends
//! them to the peak model as a [`crate::geometry::Geometry`] context.

mod edxd;
mod mono;

pub use edxd::EnergyDetector;
pub use mono::MonoDetector;

/// `n` evenly spaced samples over [0, max].
pub(crate) fn linspace(max: f64, n: usize) -> Vec<f64> {
    let n = n.max(2);
    (0..n).map(|i| max * i as f64 / (n - 1) as f64).collect()
}
