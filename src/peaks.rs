//! Per-material peak registry.
//!
//! [`PeakModel`] owns, per registered material, the derived Gaussian peak
//! parameters: centers `q0`, Miller labels `hkl`, heights `a` and widths
//! `sigma` (all index-aligned), together with the B factor and relative
//! weight needed to rebuild them when the geometry changes. Entries keep
//! insertion order so the flattening used by the synthesizers is
//! deterministic.

use crate::error::PatternError;
use crate::geometry::Geometry;
use crate::intensity;
use crate::materials::{self, Hkl};
use crate::strain::strained_gaussians;
use log::debug;
use serde::Serialize;
use std::f64::consts::TAU;

/// Peak set for one material. The four per-peak sequences have equal
/// length and index i refers to the same reflection in all of them.
#[derive(Clone, Debug, Serialize)]
pub struct MaterialPeaks {
    pub name: String,
    /// Debye-Waller B factor (A^2).
    pub b: f64,
    /// Relative abundance of this phase.
    pub weight: f64,
    /// Peak centers (1/A).
    pub q0: Vec<f64>,
    pub hkl: Vec<Hkl>,
    /// Gaussian peak heights.
    pub a: Vec<f64>,
    /// Gaussian peak widths (1/A).
    pub sigma: Vec<f64>,
}

/// All materials' flattened peak parameters, insertion order preserved.
#[derive(Clone, Debug, Default)]
pub struct FlatPeaks {
    pub q0: Vec<f64>,
    pub a: Vec<f64>,
    pub sigma: Vec<f64>,
}

/// Ordered registry of per-material peak sets.
#[derive(Clone, Debug, Default)]
pub struct PeakModel {
    entries: Vec<MaterialPeaks>,
}

impl PeakModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registered materials in insertion order.
    pub fn entries(&self) -> &[MaterialPeaks] {
        &self.entries
    }

    /// Entry for one material, if registered.
    pub fn get(&self, name: &str) -> Option<&MaterialPeaks> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Registers (or re-registers) a material: looks up its reflections
    /// below the geometry's q maximum, weights them by the physical
    /// intensity factors and derives Gaussian fit parameters. Replaces
    /// any prior entry for the same material; on failure nothing is
    /// mutated.
    pub fn add_peaks(
        &mut self,
        material: &str,
        b: f64,
        weight: f64,
        geom: &Geometry,
    ) -> Result<(), PatternError> {
        let entry = compute_entry(material, b, weight, geom)?;
        debug!(
            "registered {} peaks for {} (b={}, weight={})",
            entry.q0.len(),
            material,
            b,
            weight
        );
        match self.entries.iter_mut().find(|e| e.name == material) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    /// Rebuilds every registered material against a new geometry, keeping
    /// each entry's stored B factor and weight. All entries are recomputed
    /// before any of them is replaced, so a failure leaves the registry
    /// untouched.
    pub fn recompute(&mut self, geom: &Geometry) -> Result<(), PatternError> {
        let rebuilt: Vec<MaterialPeaks> = self
            .entries
            .iter()
            .map(|e| compute_entry(&e.name, e.b, e.weight, geom))
            .collect::<Result<_, _>>()?;
        debug!("recomputed {} material peak sets", rebuilt.len());
        self.entries = rebuilt;
        Ok(())
    }

    /// Flattens all materials' peak parameters in insertion order.
    pub fn flattened(&self) -> FlatPeaks {
        let mut flat = FlatPeaks::default();
        for e in &self.entries {
            flat.q0.extend_from_slice(&e.q0);
            flat.a.extend_from_slice(&e.a);
            flat.sigma.extend_from_slice(&e.sigma);
        }
        flat
    }

    /// Global maximum of the zero-strain composite profile evaluated at
    /// every stored peak center — the normalization reference shared by
    /// ring synthesis and relative peak heights.
    pub fn max_height(&self) -> Result<f64, PatternError> {
        let flat = self.flattened();
        if flat.q0.is_empty() {
            return Err(PatternError::EmptyModel);
        }
        let composite = strained_gaussians(&flat.q0, &flat.a, &flat.q0, &flat.sigma, 0.0);
        let max = composite.iter().cloned().fold(f64::MIN, f64::max);
        if max > 0.0 && max.is_finite() {
            Ok(max)
        } else {
            Err(PatternError::EmptyModel)
        }
    }

    /// Per-material peak heights at zero strain, normalized by the global
    /// maximum across all materials. Values lie in [0, 1]; used for peak
    /// label placement.
    pub fn relative_heights(&self) -> Result<Vec<(String, Vec<f64>)>, PatternError> {
        let a_max = self.max_height()?;
        Ok(self
            .entries
            .iter()
            .map(|e| {
                let heights = strained_gaussians(&e.q0, &e.a, &e.q0, &e.sigma, 0.0);
                (e.name.clone(), heights.iter().map(|h| h / a_max).collect())
            })
            .collect())
    }
}

/// Derives one material's peak set from the geometry context. The Gaussian
/// height is chosen so the *area* under each peak equals its physically
/// integrated intensity: `a = I / (sigma sqrt(2 pi))`.
fn compute_entry(
    material: &str,
    b: f64,
    weight: f64,
    geom: &Geometry,
) -> Result<MaterialPeaks, PatternError> {
    let reflections = materials::peak_details(geom.q_max(), material)?;
    let q0: Vec<f64> = reflections.iter().map(|r| r.q).collect();
    let hkl: Vec<Hkl> = reflections.iter().map(|r| r.hkl).collect();

    let factors = intensity::intensity_factors(material, b, &q0, geom)?;
    let sigma: Vec<f64> = q0.iter().map(|&q| geom.sigma_q.sigma_q(q)).collect();
    let a: Vec<f64> = reflections
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let integrated = factors.sf[i]
                * r.multiplicity
                * factors.tf[i]
                * factors.lp[i]
                * factors.flux[i]
                * weight;
            integrated / (sigma[i] * TAU.sqrt())
        })
        .collect();

    Ok(MaterialPeaks {
        name: material.to_string(),
        b,
        weight,
        q0,
        hkl,
        a,
        sigma,
    })
}
