//! Physical grid description.
//!
//! The computational box has `shape + 2 * nbl` points per axis,
//! world coordinate `i` sits at `origin + (i - nbl) * spacing`.
//! The physical box is the inner `shape` points.

use crate::error::*;
use crate::util::*;

const POSITION_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<const GRID_DIMENSION: usize> {
    shape: Coord<GRID_DIMENSION>,
    spacing: Position<GRID_DIMENSION>,
    origin: Position<GRID_DIMENSION>,
    nbl: i32,
}

fn check_lengths<const GRID_DIMENSION: usize>(
    shape: &[usize],
    per_axis: &[f64],
    name: &str,
    origin: &[f64],
) -> Result<()> {
    if !(1..=3).contains(&GRID_DIMENSION) {
        return Err(Error::Configuration(format!(
            "grids have 1 to 3 dimensions, got {GRID_DIMENSION}"
        )));
    }
    if shape.len() != GRID_DIMENSION
        || per_axis.len() != GRID_DIMENSION
        || origin.len() != GRID_DIMENSION
    {
        return Err(Error::Configuration(format!(
            "shape ({}), {name} ({}) and origin ({}) need {GRID_DIMENSION} entries",
            shape.len(),
            per_axis.len(),
            origin.len()
        )));
    }
    if let Some(n) = shape.iter().find(|n| **n < 2) {
        return Err(Error::Configuration(format!(
            "every axis needs at least 2 points, got {n}"
        )));
    }
    if shape.iter().any(|n| *n > i32::MAX as usize / 2) {
        return Err(Error::Configuration(format!(
            "shape {shape:?} is too large"
        )));
    }
    if let Some(v) = per_axis.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(Error::Configuration(format!(
            "{name} must be finite and positive, got {v}"
        )));
    }
    if let Some(v) = origin.iter().find(|v| !v.is_finite()) {
        return Err(Error::Configuration(format!(
            "origin must be finite, got {v}"
        )));
    }
    Ok(())
}

impl<const GRID_DIMENSION: usize> Grid<GRID_DIMENSION> {
    /// `extent[d]` is the physical length of axis `d`,
    /// spacing becomes `extent[d] / (shape[d] - 1)`.
    pub fn from_extent(
        shape: &[usize],
        extent: &[f64],
        origin: &[f64],
    ) -> Result<Self> {
        check_lengths::<GRID_DIMENSION>(shape, extent, "extent", origin)?;
        let spacing: Vec<f64> = shape
            .iter()
            .zip(extent)
            .map(|(n, e)| e / (*n as f64 - 1.0))
            .collect();
        Self::from_spacing(shape, &spacing, origin)
    }

    pub fn from_spacing(
        shape: &[usize],
        spacing: &[f64],
        origin: &[f64],
    ) -> Result<Self> {
        check_lengths::<GRID_DIMENSION>(shape, spacing, "spacing", origin)?;
        let shape_i: Vec<i32> = shape.iter().map(|n| *n as i32).collect();
        Ok(Grid {
            shape: Coord::from_column_slice(&shape_i),
            spacing: Position::from_column_slice(spacing),
            origin: Position::from_column_slice(origin),
            nbl: 0,
        })
    }

    /// Add `nbl` damping points on both sides of every axis.
    pub fn with_damping_layer(mut self, nbl: usize) -> Result<Self> {
        if nbl > i32::MAX as usize / 4 {
            return Err(Error::Configuration(format!(
                "damping layer width {nbl} is too large"
            )));
        }
        self.nbl = nbl as i32;
        Ok(self)
    }

    pub fn shape(&self) -> Coord<GRID_DIMENSION> {
        self.shape
    }

    pub fn spacing(&self) -> Position<GRID_DIMENSION> {
        self.spacing
    }

    pub fn origin(&self) -> Position<GRID_DIMENSION> {
        self.origin
    }

    pub fn nbl(&self) -> usize {
        self.nbl as usize
    }

    /// Physical size of the inner box.
    pub fn extent(&self) -> Position<GRID_DIMENSION> {
        let mut result = Position::zero();
        for d in 0..GRID_DIMENSION {
            result[d] = (self.shape[d] - 1) as f64 * self.spacing[d];
        }
        result
    }

    pub fn padded_shape(&self) -> Coord<GRID_DIMENSION> {
        self.shape.add_scalar(2 * self.nbl)
    }

    /// Computational box, damping margin included.
    pub fn aabb(&self) -> AABB<GRID_DIMENSION> {
        AABB::from_exclusive(self.padded_shape())
    }

    /// Physical box in world coordinates.
    pub fn physical_aabb(&self) -> AABB<GRID_DIMENSION> {
        AABB::from_mm(
            Coord::repeat(self.nbl),
            self.shape.add_scalar(self.nbl - 1),
        )
    }

    pub fn min_spacing(&self) -> f64 {
        self.spacing.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn position(
        &self,
        world_coord: &Coord<GRID_DIMENSION>,
    ) -> Position<GRID_DIMENSION> {
        let mut result = Position::zero();
        for d in 0..GRID_DIMENSION {
            result[d] = self.origin[d]
                + (world_coord[d] - self.nbl) as f64 * self.spacing[d];
        }
        result
    }

    /// Lowest and highest physical position of the computational box.
    pub fn padded_bounds(
        &self,
    ) -> (Position<GRID_DIMENSION>, Position<GRID_DIMENSION>) {
        let aabb = self.aabb();
        (self.position(&aabb.min()), self.position(&aabb.max()))
    }

    /// World coordinate of `position` as a real number.
    /// Positions outside the computational box are rejected.
    pub fn fractional_index(
        &self,
        position: &Position<GRID_DIMENSION>,
    ) -> Result<Position<GRID_DIMENSION>> {
        let (min, max) = self.padded_bounds();
        let n = self.padded_shape();
        let mut result = Position::zero();
        for d in 0..GRID_DIMENSION {
            let tol = POSITION_TOLERANCE * self.spacing[d];
            let p = position[d];
            if !p.is_finite() || p < min[d] - tol || p > max[d] + tol {
                return Err(Error::CoordinateOutOfRange {
                    position: position.iter().copied().collect(),
                    min: min.iter().copied().collect(),
                    max: max.iter().copied().collect(),
                });
            }
            let f = (p - self.origin[d]) / self.spacing[d] + self.nbl as f64;
            result[d] = f.clamp(0.0, (n[d] - 1) as f64);
        }
        Ok(result)
    }
}
