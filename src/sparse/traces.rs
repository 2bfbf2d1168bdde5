use crate::error::*;

/// One sample per point per time step, stored time major,
/// `data[t * npoint + p]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Traces {
    nt: usize,
    npoint: usize,
    data: Vec<f64>,
}

impl Traces {
    pub fn new(nt: usize, npoint: usize) -> Self {
        Traces {
            nt,
            npoint,
            data: vec![0.0; nt * npoint],
        }
    }

    pub fn from_data(nt: usize, npoint: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != nt * npoint {
            return Err(Error::Configuration(format!(
                "{} samples do not fill {nt} steps of {npoint} points",
                data.len()
            )));
        }
        Ok(Traces { nt, npoint, data })
    }

    /// The same signal at every point.
    pub fn broadcast(signal: &[f64], npoint: usize) -> Self {
        let mut data = Vec::with_capacity(signal.len() * npoint);
        for v in signal {
            data.extend(std::iter::repeat(*v).take(npoint));
        }
        Traces {
            nt: signal.len(),
            npoint,
            data,
        }
    }

    pub fn nt(&self) -> usize {
        self.nt
    }

    pub fn npoint(&self) -> usize {
        self.npoint
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, t: usize, p: usize) -> f64 {
        self.data[t * self.npoint + p]
    }

    /// All points at step `t`.
    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.npoint..(t + 1) * self.npoint]
    }

    pub fn row_mut(&mut self, t: usize) -> &mut [f64] {
        &mut self.data[t * self.npoint..(t + 1) * self.npoint]
    }

    /// Time series of point `p`.
    pub fn trace(&self, p: usize) -> Vec<f64> {
        (0..self.nt).map(|t| self.get(t, p)).collect()
    }

    /// Zero all samples and resize to `nt` steps.
    pub fn reset(&mut self, nt: usize) {
        self.nt = nt;
        self.data.clear();
        self.data.resize(nt * self.npoint, 0.0);
    }

    /// Element wise `self - other`.
    pub fn residual(&self, other: &Traces) -> Result<Traces> {
        if self.nt != other.nt || self.npoint != other.npoint {
            return Err(Error::Configuration(format!(
                "trace shapes differ, {}x{} and {}x{}",
                self.nt, self.npoint, other.nt, other.npoint
            )));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Ok(Traces {
            nt: self.nt,
            npoint: self.npoint,
            data,
        })
    }

    /// `1/2 sum r^2`
    pub fn half_norm_squared(&self) -> f64 {
        0.5 * self.data.iter().map(|v| v * v).sum::<f64>()
    }

    /// Steps in reverse order.
    pub fn time_reversed(&self) -> Traces {
        let mut data = Vec::with_capacity(self.data.len());
        for t in (0..self.nt).rev() {
            data.extend_from_slice(self.row(t));
        }
        Traces {
            nt: self.nt,
            npoint: self.npoint,
            data,
        }
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}
