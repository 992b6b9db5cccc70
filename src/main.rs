use std::path::Path;
use xrd_patterns::prelude::*;

fn main() -> Result<(), PatternError> {
    env_logger::init();

    // Demo: 2 m beamline-style mono setup with an Al/Fe powder mixture.
    let mut det = MonoDetector::new((2000, 2000), 0.2, 1000.0, 100.0, 1.0);
    det.add_peaks("Al")?;
    det.add_peaks("Fe")?;

    let opts = IntensityOptions {
        axis: AxisKind::TwoTheta,
        background: 0.02,
        ..Default::default()
    };
    let spectrum = det.intensity(&opts)?;
    println!(
        "spectrum: {} points over {:.2}..{:.2} deg",
        spectrum.x.len(),
        spectrum.x.first().unwrap(),
        spectrum.x.last().unwrap()
    );
    det.plot_intensity(&opts, PlotMode::All, 0.05, Path::new("intensity.png"))?;

    let ring_opts = RingOptions {
        exclude_criteria: 0.02,
        crop: 0.2,
        strain: StrainTensor::new(0.2, 0.1, 0.05),
        ..Default::default()
    };
    let img = det.rings(&ring_opts)?;
    println!("rings: {}x{} px image", img.w, img.h);
    det.plot_rings(&ring_opts, Path::new("rings.png"))?;

    Ok(())
}
