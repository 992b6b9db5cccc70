#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod error;
pub mod geometry;
pub mod materials;
pub mod setup;
pub mod strain;
pub mod synth;

// Lower-level building blocks; public for advanced callers but less
// stable than the setup-level API.
pub mod beamline;
pub mod conversions;
pub mod image;
pub mod intensity;
pub mod interp;
pub mod peaks;
pub mod plot;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::PatternError;
pub use crate::geometry::{AxisKind, DetectorMode};
pub use crate::plot::PlotMode;
pub use crate::setup::{EnergyDetector, MonoDetector};
pub use crate::strain::StrainTensor;
pub use crate::synth::{IntensityOptions, RingOptions, Spectrum};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use xrd_patterns::prelude::*;
///
/// let mut det = MonoDetector::new((500, 500), 0.2, 1000.0, 100.0, 1.0);
/// det.add_peaks("Al").unwrap();
/// let spectrum = det.intensity(&IntensityOptions::default()).unwrap();
/// assert_eq!(spectrum.x.len(), det.q_range().len());
/// ```
pub mod prelude {
    pub use crate::error::PatternError;
    pub use crate::geometry::AxisKind;
    pub use crate::plot::PlotMode;
    pub use crate::setup::{EnergyDetector, MonoDetector};
    pub use crate::strain::StrainTensor;
    pub use crate::synth::{IntensityOptions, RingOptions, Spectrum};
}
