use crate::sparse::TimeAxis;
use std::f64::consts::PI;

/// Source time signature.
pub trait Wavelet: Sync {
    fn value(&self, t: f64) -> f64;

    fn sample(&self, axis: &TimeAxis) -> Vec<f64> {
        axis.values().map(|t| self.value(t)).collect()
    }
}

/// Second derivative of a Gaussian, peak frequency `f0`,
/// centered at `t0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RickerWavelet {
    pub f0: f64,
    pub t0: f64,
}

impl RickerWavelet {
    /// Delayed by one period so the pulse starts near zero.
    pub fn new(f0: f64) -> Self {
        RickerWavelet { f0, t0: 1.0 / f0 }
    }

    pub fn with_delay(f0: f64, t0: f64) -> Self {
        RickerWavelet { f0, t0 }
    }
}

impl Wavelet for RickerWavelet {
    fn value(&self, t: f64) -> f64 {
        let r = PI * self.f0 * (t - self.t0);
        let r2 = r * r;
        (1.0 - 2.0 * r2) * (-r2).exp()
    }
}

/// Gaussian windowed cosine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GaborWavelet {
    pub f0: f64,
    pub t0: f64,
}

impl GaborWavelet {
    pub fn new(f0: f64) -> Self {
        GaborWavelet { f0, t0: 1.5 / f0 }
    }
}

impl Wavelet for GaborWavelet {
    fn value(&self, t: f64) -> f64 {
        let s = self.f0 * (t - self.t0);
        (-2.0 * s * s).exp() * (2.0 * PI * s).cos()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn ricker_shape() {
        let w = RickerWavelet::new(0.01);
        assert_approx_eq!(f64, w.t0, 100.0);
        assert_approx_eq!(f64, w.value(100.0), 1.0);
        // zero crossings at r^2 = 1/2
        let t = 100.0 + 1.0 / (PI * 0.01 * 2.0f64.sqrt());
        assert_approx_eq!(f64, w.value(t), 0.0, epsilon = 1e-12);
        assert!(w.value(0.0).abs() < 1e-3);
        assert!(w.value(140.0) < 0.0);
    }

    #[test]
    fn sample_on_axis() {
        let axis = TimeAxis::new(0.0, 1.0, 301).unwrap();
        let w = RickerWavelet::new(0.01).sample(&axis);
        assert_eq!(w.len(), 301);
        assert_approx_eq!(f64, w[100], 1.0);
        // symmetric around the delay
        assert_approx_eq!(f64, w[80], w[120], epsilon = 1e-12);

        let g = GaborWavelet::new(0.01).sample(&axis);
        assert_approx_eq!(f64, g[150], 1.0);
    }
}
