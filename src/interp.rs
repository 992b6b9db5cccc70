//! Piecewise-linear interpolation over a tabulated curve.
//!
//! Used for the energy-dispersive beamline response curves (flux and
//! energy resolution), which are only available as discrete calibration
//! samples. Evaluation outside the table's domain clamps to the boundary
//! value, matching the behaviour expected of empirical response data.

/// Monotone-x interpolation table with boundary-clamped extrapolation.
#[derive(Clone, Debug)]
pub struct Interp1d {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Interp1d {
    /// Build a table from sample points. `xs` must be strictly ascending
    /// and at least two points long.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        assert_eq!(xs.len(), ys.len(), "mismatched table lengths");
        assert!(xs.len() >= 2, "need at least two samples");
        assert!(
            xs.windows(2).all(|w| w[0] < w[1]),
            "x samples must be strictly ascending"
        );
        Self { xs, ys }
    }

    /// Evaluate the curve at `x`, clamping outside the tabulated domain.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        // Index of the first sample above x; x lies in [xs[i-1], xs[i]).
        let i = self.xs.partition_point(|&xi| xi <= x);
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_linearly_between_samples() {
        let f = Interp1d::new(vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 6.0]);
        assert!((f.eval(0.5) - 1.0).abs() < 1e-12);
        assert!((f.eval(2.0) - 4.0).abs() < 1e-12);
        assert!((f.eval(1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn clamps_outside_domain() {
        let f = Interp1d::new(vec![1.0, 2.0], vec![5.0, 7.0]);
        assert_eq!(f.eval(0.0), 5.0);
        assert_eq!(f.eval(10.0), 7.0);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn rejects_unsorted_samples() {
        Interp1d::new(vec![0.0, 0.0], vec![1.0, 2.0]);
    }
}
