use xrd_patterns::MonoDetector;

/// A small monochromatic setup that keeps ring synthesis cheap while
/// still covering the common Al/Fe reflections (q_max ~ 11 1/A).
pub fn small_mono() -> MonoDetector {
    MonoDetector::new((201, 201), 0.5, 300.0, 100.0, 1.0)
}
