//! Crystal and scattering-factor tables plus reflection lookup.
//!
//! Overview
//! - A small table of cubic elemental crystals (FCC, BCC, simple cubic,
//!   diamond) with room-temperature lattice parameters.
//! - Reflection generation up to a q cutoff: representative (h >= k >= l)
//!   Miller triples filtered by the centering selection rule, with the
//!   multiplicity counted as the number of distinct signed permutations.
//! - 4-term Gaussian atomic form-factor fits (International Tables for
//!   Crystallography, Vol. C, Table 6.1.1.4) evaluated at s = q / 4 pi.
//!
//! Non-cubic structures are out of scope; the tables cover the common
//! calibration metals plus silicon.

use crate::error::PatternError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

/// Cubic Bravais centering, determining the reflection selection rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Centering {
    Primitive,
    BodyCentered,
    FaceCentered,
    Diamond,
}

impl Centering {
    /// Whether the (h, k, l) reflection is allowed for this centering.
    pub fn allows(&self, h: i32, k: i32, l: i32) -> bool {
        match self {
            Centering::Primitive => true,
            Centering::BodyCentered => (h + k + l) % 2 == 0,
            Centering::FaceCentered => {
                let parity = |v: i32| v.rem_euclid(2);
                parity(h) == parity(k) && parity(k) == parity(l)
            }
            // FCC rule plus the glide condition: all odd, or all even
            // with h + k + l divisible by 4.
            Centering::Diamond => {
                let all_odd = h % 2 != 0 && k % 2 != 0 && l % 2 != 0;
                let all_even = h % 2 == 0 && k % 2 == 0 && l % 2 == 0;
                all_odd || (all_even && (h + k + l) % 4 == 0)
            }
        }
    }
}

/// Cubic crystal entry: element symbol, centering and lattice parameter.
#[derive(Clone, Copy, Debug)]
pub struct Crystal {
    pub symbol: &'static str,
    pub centering: Centering,
    /// Lattice parameter (Angstrom).
    pub a: f64,
}

const CRYSTALS: &[Crystal] = &[
    Crystal { symbol: "Al", centering: Centering::FaceCentered, a: 4.0495 },
    Crystal { symbol: "Ni", centering: Centering::FaceCentered, a: 3.5238 },
    Crystal { symbol: "Cu", centering: Centering::FaceCentered, a: 3.6149 },
    Crystal { symbol: "V", centering: Centering::BodyCentered, a: 3.0274 },
    Crystal { symbol: "Cr", centering: Centering::BodyCentered, a: 2.8848 },
    Crystal { symbol: "Fe", centering: Centering::BodyCentered, a: 2.8665 },
    Crystal { symbol: "Mo", centering: Centering::BodyCentered, a: 3.1470 },
    Crystal { symbol: "W", centering: Centering::BodyCentered, a: 3.1652 },
    Crystal { symbol: "Si", centering: Centering::Diamond, a: 5.4307 },
];

/// Look up a crystal entry by element symbol.
pub fn crystal(symbol: &str) -> Option<&'static Crystal> {
    CRYSTALS.iter().find(|c| c.symbol == symbol)
}

/// Miller indices of a reflection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Hkl(pub [i32; 3]);

impl fmt::Display for Hkl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [h, k, l] = self.0;
        write!(f, "{h}{k}{l}")
    }
}

/// A powder reflection: representative Miller indices, peak position and
/// the number of symmetry-equivalent planes contributing to it.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Reflection {
    pub hkl: Hkl,
    /// Peak center (1/A).
    pub q: f64,
    pub multiplicity: f64,
}

/// Number of distinct signed permutations of (h, k, l) — the cubic powder
/// multiplicity, e.g. 8 for (111), 6 for (200), 24 for (211).
fn multiplicity(h: i32, k: i32, l: i32) -> f64 {
    let mut seen = BTreeSet::new();
    let perms = [
        [h, k, l], [h, l, k], [k, h, l], [k, l, h], [l, h, k], [l, k, h],
    ];
    for p in perms {
        for signs in 0..8u8 {
            let apply = |v: i32, bit: u8| if signs >> bit & 1 == 1 { -v } else { v };
            seen.insert([apply(p[0], 0), apply(p[1], 1), apply(p[2], 2)]);
        }
    }
    seen.len() as f64
}

/// Returns all reflections of `material` with q <= `q_max`, ascending in
/// q. Fails when the material is unknown or no reflection falls inside
/// the range; no partial result is produced.
pub fn peak_details(q_max: f64, material: &str) -> Result<Vec<Reflection>, PatternError> {
    let crystal =
        crystal(material).ok_or_else(|| PatternError::UnknownMaterial(material.to_string()))?;

    // q = 2 pi sqrt(h^2 + k^2 + l^2) / a, so indices are bounded by
    // q_max * a / 2 pi.
    let h_max = (q_max * crystal.a / (2.0 * PI)).floor() as i32;
    let mut reflections = Vec::new();
    for h in 0..=h_max {
        for k in 0..=h {
            for l in 0..=k {
                if h == 0 && k == 0 && l == 0 {
                    continue;
                }
                if !crystal.centering.allows(h, k, l) {
                    continue;
                }
                let n = (h * h + k * k + l * l) as f64;
                let q = 2.0 * PI * n.sqrt() / crystal.a;
                if q > q_max {
                    continue;
                }
                reflections.push(Reflection {
                    hkl: Hkl([h, k, l]),
                    q,
                    multiplicity: multiplicity(h, k, l),
                });
            }
        }
    }

    if reflections.is_empty() {
        return Err(PatternError::UnknownMaterial(material.to_string()));
    }
    reflections.sort_by(|a, b| a.q.total_cmp(&b.q).then(a.hkl.0.cmp(&b.hkl.0)));
    Ok(reflections)
}

/// 4-term Gaussian form-factor fit: f(s) = c + sum_i a_i exp(-b_i s^2)
/// with s = sin(theta) / lambda = q / 4 pi.
#[derive(Clone, Copy, Debug)]
pub struct FormFactor {
    pub a: [f64; 4],
    pub b: [f64; 4],
    pub c: f64,
}

impl FormFactor {
    /// Evaluate the fit at momentum transfer `q` (1/A).
    pub fn at_q(&self, q: f64) -> f64 {
        let s = q / (4.0 * PI);
        let s2 = s * s;
        let mut f = self.c;
        for i in 0..4 {
            f += self.a[i] * (-self.b[i] * s2).exp();
        }
        f
    }
}

const FORM_FACTORS: &[(&str, FormFactor)] = &[
    ("Al", FormFactor {
        a: [6.4202, 1.9002, 1.5936, 1.9646],
        b: [3.0387, 0.7426, 31.5472, 85.0886],
        c: 1.1151,
    }),
    ("Si", FormFactor {
        a: [6.2915, 3.0353, 1.9891, 1.5410],
        b: [2.4386, 32.3337, 0.6785, 81.6937],
        c: 1.1407,
    }),
    ("V", FormFactor {
        a: [10.2971, 7.3511, 2.0703, 2.0571],
        b: [6.8657, 0.4385, 26.8938, 102.478],
        c: 1.2199,
    }),
    ("Cr", FormFactor {
        a: [10.6406, 7.3537, 3.3240, 1.4922],
        b: [6.1038, 0.3920, 20.2626, 98.7399],
        c: 1.1832,
    }),
    ("Fe", FormFactor {
        a: [11.7695, 7.3573, 3.5222, 2.3045],
        b: [4.7611, 0.3072, 15.3535, 76.8805],
        c: 1.0369,
    }),
    ("Ni", FormFactor {
        a: [12.8376, 7.2920, 4.4438, 2.3800],
        b: [3.8785, 0.2565, 12.1763, 66.3421],
        c: 1.0341,
    }),
    ("Cu", FormFactor {
        a: [13.3380, 7.1676, 5.6158, 1.6735],
        b: [3.5828, 0.2470, 11.3966, 64.8126],
        c: 1.1910,
    }),
    ("Mo", FormFactor {
        a: [3.7025, 17.2356, 12.8876, 3.7429],
        b: [0.2772, 1.0958, 11.0040, 61.6584],
        c: 4.3875,
    }),
    ("W", FormFactor {
        a: [29.0818, 15.4300, 14.4327, 5.1198],
        b: [1.7203, 9.2259, 0.3217, 57.0560],
        c: 9.8875,
    }),
];

/// Look up the form-factor fit for an element symbol.
pub fn form_factor(symbol: &str) -> Option<&'static FormFactor> {
    FORM_FACTORS
        .iter()
        .find(|(sym, _)| *sym == symbol)
        .map(|(_, ff)| ff)
}
