//! Crate-wide error taxonomy.
//!
//! All failures are surfaced synchronously; no operation commits partial
//! state before its fallible steps have succeeded.

use crate::geometry::AxisKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    /// The requested display axis is not available for the detector mode.
    /// `q` is always valid; the secondary axis is `2theta` for
    /// monochromatic setups and `energy` for energy-dispersive ones.
    #[error("axis `{axis}` is not available in {mode} mode")]
    AxisMode {
        axis: AxisKind,
        mode: &'static str,
    },

    /// The material is not in the crystal/form-factor tables, or no
    /// reflection falls below the requested maximum q.
    #[error("unknown material `{0}` or no reflections in the q range")]
    UnknownMaterial(String),

    /// No calibration table exists for the requested beamline id.
    #[error("unknown beamline `{0}`")]
    UnknownBeamline(String),

    /// The operation is not available on this detector variant.
    #[error("{0}")]
    NotSupported(&'static str),

    /// The crop fraction is negative, or removes every detector pixel.
    #[error("crop fraction {0} leaves no detector pixels")]
    Crop(f64),

    /// The fixed scattering angle must be strictly positive.
    #[error("scattering angle must be positive, got {0} rad")]
    Angle(f64),

    /// Normalization requires a nonzero maximum, so an empty peak registry
    /// (or one with vanishing heights) is a defined failure rather than a
    /// silent NaN.
    #[error("no registered peaks to normalize against")]
    EmptyModel,

    /// A plotting backend failed while rendering a presentation wrapper.
    #[error("failed to render plot: {0}")]
    Render(String),
}
