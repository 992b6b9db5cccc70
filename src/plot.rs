//! Presentation wrappers over the numeric API.
//!
//! Everything here re-uses the non-plotting entry points and renders
//! their results to PNG files; no numeric behaviour lives in this module.

use crate::error::PatternError;
use crate::geometry::{AxisKind, Geometry};
use crate::intensity;
use crate::peaks::PeakModel;
use crate::synth::{self, IntensityOptions};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which curves a spectrum plot shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotMode {
    /// Per-material curves only, rescaled so the tallest material peaks
    /// at 1. The noisy composite is omitted.
    Separate,
    /// Only the noisy composite.
    Total,
    /// Per-material curves, plus the composite when more than one
    /// material is registered.
    #[default]
    All,
}

fn render_err<E: std::fmt::Display>(e: E) -> PatternError {
    PatternError::Render(e.to_string())
}

/// Rescales the material curves in place by their shared maximum so the
/// tallest material peaks at 1. Returns that maximum in the input units.
fn separate_rescale(curves: &mut [(String, Vec<f64>)]) -> f64 {
    let i_max = curves
        .iter()
        .flat_map(|(_, c)| c.iter().copied())
        .fold(f64::MIN, f64::max);
    for (_, curve) in curves.iter_mut() {
        for v in curve.iter_mut() {
            *v /= i_max;
        }
    }
    i_max
}

/// Renders the normalized intensity profile with hkl labels above peaks
/// whose relative height exceeds `exclude_labels`. `mode` selects the
/// drawn curves; labels are skipped in [`PlotMode::Total`].
pub fn plot_intensity(
    model: &PeakModel,
    geom: &Geometry,
    opts: &IntensityOptions,
    mode: PlotMode,
    exclude_labels: f64,
    path: &Path,
) -> Result<(), PatternError> {
    let mut spectrum = synth::intensity(model, geom, opts)?;
    let rel = model.relative_heights()?;
    let strain = opts.strain.resolve(opts.phi);

    // Scale for label heights: the noiseless composite's maximum in the
    // already-normalized units of the spectrum.
    let mut noiseless = vec![0.0; spectrum.x.len()];
    for (_, curve) in &spectrum.curves {
        for (t, &c) in noiseless.iter_mut().zip(curve) {
            *t += c;
        }
    }
    let noiseless_max = noiseless.iter().cloned().fold(f64::MIN, f64::max);

    // Separate mode renormalizes the material curves; labels follow the
    // same rescale so they stay glued to their peaks.
    let label_scale = match mode {
        PlotMode::Separate => noiseless_max / separate_rescale(&mut spectrum.curves),
        _ => noiseless_max,
    };

    let mut labels: Vec<(f64, f64, String)> = Vec::new();
    if mode != PlotMode::Total {
        for ((name, heights), entry) in rel.iter().zip(model.entries()) {
            debug_assert_eq!(name, &entry.name);
            for (i, &h) in heights.iter().enumerate() {
                if h > exclude_labels {
                    let q_shifted = entry.q0[i] * (1.0 + strain);
                    let x = match spectrum.axis {
                        AxisKind::Q => q_shifted,
                        _ => geom.mode.convert(q_shifted),
                    };
                    labels.push((x, 0.005 + h * label_scale, entry.hkl[i].to_string()));
                }
            }
        }
    }

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let x_min = spectrum.x.first().copied().unwrap_or(0.0);
    let x_max = spectrum.x.last().copied().unwrap_or(1.0);
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_min..x_max, 0.0..1.05f64)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc(spectrum.axis.label())
        .y_desc("relative intensity")
        .draw()
        .map_err(render_err)?;

    if mode != PlotMode::Total {
        for (i, (name, curve)) in spectrum.curves.iter().enumerate() {
            let color = Palette99::pick(i).mix(1.0);
            chart
                .draw_series(LineSeries::new(
                    spectrum.x.iter().zip(curve).map(|(&x, &y)| (x, y)),
                    &color,
                ))
                .map_err(render_err)?
                .label(name.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
        }
    }
    let draw_total = match mode {
        PlotMode::Separate => false,
        PlotMode::Total => true,
        PlotMode::All => spectrum.curves.len() > 1,
    };
    if draw_total {
        chart
            .draw_series(LineSeries::new(
                spectrum.x.iter().zip(&spectrum.total).map(|(&x, &y)| (x, y)),
                &BLACK,
            ))
            .map_err(render_err)?
            .label("total")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLACK));
    }
    chart
        .draw_series(labels.iter().map(|(x, y, text)| {
            Text::new(text.clone(), (*x, *y), ("sans-serif", 13).into_font())
        }))
        .map_err(render_err)?;
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    Ok(())
}

/// Renders each normalized intensity-factor curve and their combined
/// product for a material over the geometry's q grid. The region below
/// q = 2 is skipped, where the Lorentz-polarization factor diverges.
pub fn plot_intensity_factors(
    material: &str,
    b: f64,
    geom: &Geometry,
    axis: AxisKind,
    path: &Path,
) -> Result<(), PatternError> {
    geom.mode.check_axis(axis)?;

    let q: Vec<f64> = geom.q_range.iter().copied().filter(|&q| q > 2.0).collect();
    if q.len() < 2 {
        return Err(PatternError::Render(
            "q range too short for factor curves".to_string(),
        ));
    }
    let factors = intensity::intensity_factors(material, b, &q, geom)?;

    let normalized = |values: &[f64]| -> Vec<f64> {
        let max = values.iter().cloned().fold(f64::MIN, f64::max);
        values.iter().map(|v| v / max).collect()
    };
    let curves = [
        ("flux", normalized(&factors.flux)),
        ("lorentz", normalized(&factors.lp)),
        ("scatter", normalized(&factors.sf)),
        ("temp", normalized(&factors.tf)),
        ("total", normalized(&factors.combined())),
    ];

    let x = geom.mode.axis_values(&q, axis);
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x[0]..x[x.len() - 1], 0.0..1.05f64)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc(axis.label())
        .y_desc("relative intensity factor")
        .draw()
        .map_err(render_err)?;

    for (i, (name, curve)) in curves.iter().enumerate() {
        let color = Palette99::pick(i).mix(1.0);
        chart
            .draw_series(LineSeries::new(
                x.iter().zip(curve).map(|(&x, &y)| (x, y)),
                &color,
            ))
            .map_err(render_err)?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_rescale_normalizes_by_the_tallest_material() {
        let mut curves = vec![
            ("a".to_string(), vec![0.1, 0.4, 0.2]),
            ("b".to_string(), vec![0.05, 0.1, 0.8]),
        ];
        let i_max = separate_rescale(&mut curves);
        assert_eq!(i_max, 0.8);
        // The tallest material now peaks at exactly 1; the others keep
        // their relative scale.
        assert!((curves[1].1[2] - 1.0).abs() < 1e-12);
        assert!((curves[0].1[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn default_mode_shows_everything() {
        assert_eq!(PlotMode::default(), PlotMode::All);
    }
}
