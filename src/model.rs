//! Acoustic velocity model.
//!
//! Velocities are given on the physical box and extended into the
//! damping margin by repeating the edge values. The wave equation
//! then uses `m = 1 / v^2` and the damping profile of the margin.

use crate::damping::damping_profile;
use crate::domain::*;
use crate::error::*;
use crate::grid::Grid;
use crate::pde::*;
use crate::stability;
use crate::util::*;
use rayon::prelude::*;

#[derive(Clone, Debug)]
pub struct VelocityModel<const GRID_DIMENSION: usize> {
    grid: Grid<GRID_DIMENSION>,
    velocity: OwnedDomain<GRID_DIMENSION>,
    space_order: usize,
    critical_dt: f64,
}

impl<const GRID_DIMENSION: usize> VelocityModel<GRID_DIMENSION> {
    /// `velocity` holds one value per physical point in row major order
    /// over `grid.shape()`, the last axis fastest.
    /// `grid` gets a damping margin of `nbl` points.
    pub fn new(
        grid: Grid<GRID_DIMENSION>,
        velocity: &[f64],
        nbl: usize,
        space_order: usize,
        chunk_size: usize,
    ) -> Result<Self> {
        let grid = grid.with_damping_layer(nbl)?;
        let physical_size = AABB::from_exclusive(grid.shape());
        if velocity.len() != physical_size.buffer_size() {
            return Err(Error::Configuration(format!(
                "{} velocity values for a grid of {} points",
                velocity.len(),
                physical_size.buffer_size()
            )));
        }
        if let Some(v) =
            velocity.iter().find(|v| !(v.is_finite() && **v > 0.0))
        {
            return Err(Error::Configuration(format!(
                "velocities must be finite and positive, got {v}"
            )));
        }

        let physical = grid.physical_aabb();
        let nbl_coord = Coord::<GRID_DIMENSION>::repeat(grid.nbl() as i32);
        let mut padded = OwnedDomain::new(grid.aabb());
        padded.par_modify_access(chunk_size).for_each(
            |mut d: DomainChunk<'_, GRID_DIMENSION>| {
                d.coord_iter_mut().for_each(|(world_coord, value_mut)| {
                    let mut inside = world_coord;
                    for axis in 0..GRID_DIMENSION {
                        inside[axis] = inside[axis]
                            .clamp(physical.min()[axis], physical.max()[axis]);
                    }
                    let i =
                        physical_size.coord_to_linear(&(inside - nbl_coord));
                    *value_mut = velocity[i];
                })
            },
        );

        let mut model = VelocityModel {
            grid,
            velocity: padded,
            space_order,
            critical_dt: 0.0,
        };
        model.critical_dt = stability::critical_dt(&model.pde(chunk_size)?);
        Ok(model)
    }

    /// Uniform velocity.
    pub fn constant(
        grid: Grid<GRID_DIMENSION>,
        velocity: f64,
        nbl: usize,
        space_order: usize,
        chunk_size: usize,
    ) -> Result<Self> {
        let n = AABB::from_exclusive(grid.shape()).buffer_size();
        Self::new(grid, &vec![velocity; n], nbl, space_order, chunk_size)
    }

    pub fn grid(&self) -> &Grid<GRID_DIMENSION> {
        &self.grid
    }

    pub fn space_order(&self) -> usize {
        self.space_order
    }

    /// Padded velocities over the computational box.
    pub fn velocity(&self) -> &OwnedDomain<GRID_DIMENSION> {
        &self.velocity
    }

    pub fn spacing(&self) -> Position<GRID_DIMENSION> {
        self.grid.spacing()
    }

    pub fn domain_size(&self) -> Position<GRID_DIMENSION> {
        self.grid.extent()
    }

    pub fn vmax(&self) -> f64 {
        self.velocity
            .buffer()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn vmin(&self) -> f64 {
        self.velocity
            .buffer()
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest stable time step of the damped wave equation.
    pub fn critical_dt(&self) -> f64 {
        self.critical_dt
    }

    /// Squared slowness `1 / v^2`.
    pub fn mass(&self, chunk_size: usize) -> Parameter<GRID_DIMENSION> {
        Parameter::Field(self.map_velocity(|v| 1.0 / (v * v), chunk_size))
    }

    pub fn damping(&self, chunk_size: usize) -> Parameter<GRID_DIMENSION> {
        Parameter::Field(damping_profile(&self.grid, chunk_size))
    }

    /// `m u_tt + eta u_t = laplacian(u)`, without damping for `nbl = 0`.
    pub fn pde(&self, chunk_size: usize) -> Result<Pde<GRID_DIMENSION>> {
        let damping = (self.grid.nbl() > 0).then(|| self.damping(chunk_size));
        Pde::wave(
            self.mass(chunk_size),
            damping,
            self.space_order,
            &self.grid.spacing(),
        )
    }

    /// Source scale `dt^2 / m`.
    pub fn injection_scale(
        &self,
        dt: f64,
        chunk_size: usize,
    ) -> Parameter<GRID_DIMENSION> {
        let dt2 = dt * dt;
        Parameter::Field(self.map_velocity(|v| dt2 * v * v, chunk_size))
    }

    fn map_velocity<F: Fn(f64) -> f64 + Send + Sync>(
        &self,
        f: F,
        chunk_size: usize,
    ) -> OwnedDomain<GRID_DIMENSION> {
        let mut result = OwnedDomain::new(*self.velocity.aabb());
        let velocity = self.velocity.buffer();
        result.par_modify_access(chunk_size).for_each(
            |mut d: DomainChunk<'_, GRID_DIMENSION>| {
                d.indexed_iter_mut().for_each(|(i, _, value_mut)| {
                    *value_mut = f(velocity[i]);
                })
            },
        );
        result
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn edge_replication() {
        let grid = Grid::<2>::from_spacing(&[2, 3], &[10.0, 10.0], &[0.0, 0.0])
            .unwrap();
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let model = VelocityModel::new(grid, &v, 2, 2, 5).unwrap();
        let padded = model.velocity();
        assert_eq!(padded.aabb(), &AABB::new(matrix![0, 5; 0, 6]));
        assert_eq!(padded.view(&vector![2, 2]), 1.0);
        assert_eq!(padded.view(&vector![3, 4]), 6.0);
        assert_eq!(padded.view(&vector![0, 0]), 1.0);
        assert_eq!(padded.view(&vector![5, 6]), 6.0);
        assert_eq!(padded.view(&vector![0, 3]), 2.0);
        assert_eq!(padded.view(&vector![4, 1]), 4.0);
        assert_eq!(model.vmax(), 6.0);
        assert_eq!(model.vmin(), 1.0);
        assert_approx_eq!(f64, model.domain_size()[1], 20.0);
    }

    #[test]
    fn critical_dt_matches_constant_velocity() {
        let grid =
            Grid::<2>::from_spacing(&[21, 21], &[10.0, 10.0], &[0.0, 0.0])
                .unwrap();
        let model = VelocityModel::constant(grid, 1500.0, 10, 2, 64).unwrap();
        assert_approx_eq!(
            f64,
            model.critical_dt(),
            10.0 / (2.0f64.sqrt() * 1500.0),
            epsilon = 1e-12
        );

        let scale = model.injection_scale(1e-3, 64);
        assert_approx_eq!(
            f64,
            scale.value(0),
            1e-6 * 1500.0 * 1500.0,
            epsilon = 1e-9
        );
        assert_approx_eq!(f64, model.mass(64).min(), 1.0 / (1500.0 * 1500.0));
    }

    #[test]
    fn rejects_bad_velocities() {
        let grid = Grid::<1>::from_spacing(&[4], &[1.0], &[0.0]).unwrap();
        assert!(VelocityModel::new(grid.clone(), &[1.0; 3], 0, 2, 4).is_err());
        let with_zero = [1.0, 0.0, 1.0, 1.0];
        assert!(VelocityModel::new(grid.clone(), &with_zero, 0, 2, 4).is_err());
        assert!(VelocityModel::new(grid, &[1.0; 4], 0, 3, 4).is_err());
    }
}
