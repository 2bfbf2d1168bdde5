use crate::error::*;
use crate::stencil::*;
use crate::util::*;

/// Spatial operator as a list of neighbor offsets and weights.
/// Offsets are unique, duplicates are merged on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearStencil<const GRID_DIMENSION: usize> {
    offset_weights: Vec<(Coord<GRID_DIMENSION>, f64)>,
}

impl<const GRID_DIMENSION: usize> LinearStencil<GRID_DIMENSION> {
    pub fn new(offset_weights: Vec<(Coord<GRID_DIMENSION>, f64)>) -> Self {
        let mut result = LinearStencil {
            offset_weights: Vec::with_capacity(offset_weights.len()),
        };
        for (offset, weight) in offset_weights {
            result.push(offset, weight);
        }
        result
    }

    /// The zero operator.
    pub fn zero() -> Self {
        LinearStencil {
            offset_weights: Vec::new(),
        }
    }

    /// Derivative along `axis` with grid spacing `h`.
    pub fn axis_derivative(
        axis: usize,
        order: usize,
        side: Side,
        accuracy: usize,
        h: f64,
    ) -> Result<Self> {
        if axis >= GRID_DIMENSION {
            return Err(Error::Configuration(format!(
                "axis {axis} out of range for a {GRID_DIMENSION}-d grid"
            )));
        }
        let d = DerivativeStencil::new(order, side, accuracy)?;
        let scale = 1.0 / h.powi(order as i32);
        Ok(Self::new(
            d.offsets
                .iter()
                .zip(&d.weights)
                .map(|(o, w)| {
                    let mut offset = Coord::zero();
                    offset[axis] = *o;
                    (offset, w * scale)
                })
                .collect(),
        ))
    }

    /// Sum of centered second derivatives.
    pub fn laplacian(
        space_order: usize,
        spacing: &Position<GRID_DIMENSION>,
    ) -> Result<Self> {
        let mut result = Self::zero();
        for d in 0..GRID_DIMENSION {
            let dd = Self::axis_derivative(
                d,
                2,
                Side::Centered,
                space_order,
                spacing[d],
            )?;
            result = result.add(&dd);
        }
        Ok(result)
    }

    fn push(&mut self, offset: Coord<GRID_DIMENSION>, weight: f64) {
        if weight == 0.0 {
            return;
        }
        if let Some((_, w)) =
            self.offset_weights.iter_mut().find(|(o, _)| *o == offset)
        {
            *w += weight;
        } else {
            self.offset_weights.push((offset, weight));
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (offset, weight) in &other.offset_weights {
            result.push(*offset, *weight);
        }
        result
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.offset_weights
                .iter()
                .map(|(o, w)| (*o, w * factor))
                .collect(),
        )
    }

    pub fn offset_weights(&self) -> &[(Coord<GRID_DIMENSION>, f64)] {
        &self.offset_weights
    }

    pub fn is_empty(&self) -> bool {
        self.offset_weights.is_empty()
    }

    pub fn slopes(&self) -> Bounds<GRID_DIMENSION> {
        let mut result = Bounds::zero();
        for (offset, _) in &self.offset_weights {
            for d in 0..GRID_DIMENSION {
                let neighbor_d = offset[d];
                if neighbor_d > 0 {
                    result[(d, 1)] = result[(d, 1)].max(neighbor_d);
                } else {
                    result[(d, 0)] = result[(d, 0)].max(-neighbor_d);
                }
            }
        }
        result
    }

    /// Fourier symbol `S(theta) = sum w exp(i theta . offset)`,
    /// returned as (real, imaginary).
    pub fn symbol(&self, theta: &Position<GRID_DIMENSION>) -> (f64, f64) {
        let mut re = 0.0;
        let mut im = 0.0;
        for (offset, weight) in &self.offset_weights {
            let phase: f64 =
                (0..GRID_DIMENSION).map(|d| theta[d] * offset[d] as f64).sum();
            re += weight * phase.cos();
            im += weight * phase.sin();
        }
        (re, im)
    }

    /// Apply to a function of the neighbor offsets.
    pub fn apply<F: Fn(&Coord<GRID_DIMENSION>) -> f64>(&self, f: F) -> f64 {
        self.offset_weights.iter().map(|(o, w)| w * f(o)).sum()
    }
}
