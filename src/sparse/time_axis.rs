use crate::error::*;

/// Uniform sampling of simulated time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeAxis {
    pub start: f64,
    pub step: f64,
    pub num: usize,
}

impl TimeAxis {
    pub fn new(start: f64, step: f64, num: usize) -> Result<Self> {
        if !start.is_finite() {
            return Err(Error::Configuration(format!(
                "time axis start must be finite, got {start}"
            )));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::Configuration(format!(
                "time axis step must be positive, got {step}"
            )));
        }
        Ok(TimeAxis { start, step, num })
    }

    /// Every sample in `[start, stop]`.
    pub fn from_stop(start: f64, stop: f64, step: f64) -> Result<Self> {
        if !stop.is_finite() || stop < start {
            return Err(Error::Configuration(format!(
                "time axis stop {stop} is before start {start}"
            )));
        }
        let axis = Self::new(start, step, 0)?;
        let intervals = ((stop - start) / step + 1e-9).floor();
        if intervals >= u32::MAX as f64 {
            return Err(Error::Configuration(format!(
                "time axis [{start}, {stop}] needs too many steps of {step}"
            )));
        }
        Ok(TimeAxis {
            num: intervals as usize + 1,
            ..axis
        })
    }

    pub fn time(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    /// Time of the last sample.
    pub fn stop(&self) -> f64 {
        self.time(self.num.saturating_sub(1))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num).map(|i| self.time(i))
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn from_stop_counts() {
        let axis = TimeAxis::from_stop(0.0, 1000.0, 2.0).unwrap();
        assert_eq!(axis.num, 501);
        assert_approx_eq!(f64, axis.stop(), 1000.0);

        let axis = TimeAxis::from_stop(0.0, 1.0, 0.3).unwrap();
        assert_eq!(axis.num, 4);
        assert_approx_eq!(f64, axis.stop(), 0.9, epsilon = 1e-12);

        let axis = TimeAxis::from_stop(0.0, 0.1, 0.1 / 3.0).unwrap();
        assert_eq!(axis.num, 4);
        assert_eq!(axis.values().count(), 4);

        assert!(TimeAxis::from_stop(1.0, 0.0, 0.1).is_err());
        assert!(TimeAxis::new(0.0, 0.0, 3).is_err());
    }

    #[test]
    fn from_stop_rejects_bad_steps() {
        for step in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TimeAxis::from_stop(0.0, 1.0, step),
                Err(Error::Configuration(_))
            ));
        }
        assert!(matches!(
            TimeAxis::from_stop(0.0, 1.0, 1e-300),
            Err(Error::Configuration(_))
        ));
        let axis = TimeAxis::from_stop(2.0, 2.0, 0.5).unwrap();
        assert_eq!(axis.num, 1);
    }
}
