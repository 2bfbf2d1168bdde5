use crate::domain::*;
use crate::error::*;
use crate::grid::Grid;
use crate::pde::Parameter;
use crate::util::*;

/// Off grid points with their multilinear interpolation supports.
///
/// Each point spreads over the `2^D` corners of its enclosing cell with
/// weights that are products of `1 - f` and `f` per axis, `f` being the
/// fractional position inside the cell. Injection and interpolation use
/// the same weights, so one is the transpose of the other.
/// Points on the upper edge of the box use the last cell.
#[derive(Clone, Debug)]
pub struct SparsePoints<const GRID_DIMENSION: usize> {
    positions: Vec<Position<GRID_DIMENSION>>,
    supports: Vec<Vec<(usize, f64)>>,
    aabb: AABB<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> SparsePoints<GRID_DIMENSION> {
    pub fn new(
        grid: &Grid<GRID_DIMENSION>,
        positions: Vec<Position<GRID_DIMENSION>>,
    ) -> Result<Self> {
        let aabb = grid.aabb();
        let cells = aabb.cell_bounds();
        let mut supports = Vec::with_capacity(positions.len());
        for position in &positions {
            let index = grid.fractional_index(position)?;
            let mut base = Coord::<GRID_DIMENSION>::zero();
            let mut frac = Position::<GRID_DIMENSION>::zero();
            for d in 0..GRID_DIMENSION {
                let b = (index[d].floor() as i32)
                    .clamp(cells.min()[d], cells.max()[d]);
                base[d] = b;
                frac[d] = index[d] - b as f64;
            }

            let mut support = Vec::with_capacity(1 << GRID_DIMENSION);
            for corner in 0..(1usize << GRID_DIMENSION) {
                let mut coord = base;
                let mut weight = 1.0;
                for d in 0..GRID_DIMENSION {
                    if corner & (1 << d) != 0 {
                        coord[d] += 1;
                        weight *= frac[d];
                    } else {
                        weight *= 1.0 - frac[d];
                    }
                }
                support.push((aabb.coord_to_linear(&coord), weight));
            }
            supports.push(support);
        }
        Ok(SparsePoints {
            positions,
            supports,
            aabb,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Box the supports index into.
    pub fn aabb(&self) -> &AABB<GRID_DIMENSION> {
        &self.aabb
    }

    pub fn positions(&self) -> &[Position<GRID_DIMENSION>] {
        &self.positions
    }

    /// Linear indices and weights of point `i`.
    pub fn support(&self, i: usize) -> &[(usize, f64)] {
        &self.supports[i]
    }

    /// Sum of squared weights, what sampling at a point returns
    /// right after injecting a unit impulse there.
    pub fn self_weight(&self, i: usize) -> f64 {
        self.supports[i].iter().map(|(_, w)| w * w).sum()
    }

    /// Add `amplitudes[i] * weight * scale(corner)` into every corner.
    pub fn inject<DomainType: DomainView<GRID_DIMENSION>>(
        &self,
        domain: &mut DomainType,
        amplitudes: &[f64],
        scale: &Parameter<GRID_DIMENSION>,
    ) {
        debug_assert_eq!(domain.aabb(), &self.aabb);
        debug_assert_eq!(amplitudes.len(), self.len());
        let buffer = domain.buffer_mut();
        for (support, amplitude) in self.supports.iter().zip(amplitudes) {
            for (linear_index, weight) in support {
                buffer[*linear_index] +=
                    amplitude * weight * scale.value(*linear_index);
            }
        }
    }

    /// Multilinear samples of `domain`, one per point.
    pub fn interpolate<DomainType: DomainView<GRID_DIMENSION>>(
        &self,
        domain: &DomainType,
        samples: &mut [f64],
    ) {
        debug_assert_eq!(domain.aabb(), &self.aabb);
        debug_assert_eq!(samples.len(), self.len());
        let buffer = domain.buffer();
        for (support, sample) in self.supports.iter().zip(samples.iter_mut()) {
            *sample = support.iter().map(|(i, w)| w * buffer[*i]).sum();
        }
    }
}
