//! Absorbing layer.
//!
//! Inside the physical box the damping is zero, in the margin it ramps
//! up with the distance `p` (in layer widths) from the physical box:
//! `eta = sum_d a (p_d - sin(2 pi p_d) / 2 pi) / h_d`.

use crate::domain::*;
use crate::grid::Grid;
use rayon::prelude::*;

/// Ramp amplitude, `1.5 ln(1000) / 40`.
pub fn damping_amplitude() -> f64 {
    1.5 * 1000.0f64.ln() / 40.0
}

fn ramp(p: f64) -> f64 {
    p - (2.0 * std::f64::consts::PI * p).sin() / (2.0 * std::f64::consts::PI)
}

/// Damping coefficient over the computational box of `grid`.
pub fn damping_profile<const GRID_DIMENSION: usize>(
    grid: &Grid<GRID_DIMENSION>,
    chunk_size: usize,
) -> OwnedDomain<GRID_DIMENSION> {
    profiling::scope!("damping::damping_profile");
    let mut result = OwnedDomain::new(grid.aabb());
    let nbl = grid.nbl();
    if nbl == 0 {
        return result;
    }
    let physical = grid.physical_aabb();
    let spacing = grid.spacing();
    let a = damping_amplitude();
    result.par_modify_access(chunk_size).for_each(
        |mut d: DomainChunk<'_, GRID_DIMENSION>| {
            d.coord_iter_mut().for_each(|(world_coord, value_mut)| {
                let mut eta = 0.0;
                for axis in 0..GRID_DIMENSION {
                    let below = physical.min()[axis] - world_coord[axis];
                    let above = world_coord[axis] - physical.max()[axis];
                    let dist = below.max(above).max(0);
                    if dist > 0 {
                        let p = dist as f64 / nbl as f64;
                        eta += a * ramp(p) / spacing[axis];
                    }
                }
                *value_mut = eta;
            })
        },
    );
    result
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::util::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn zero_inside_monotone_outside() {
        let grid = Grid::<2>::from_spacing(&[6, 8], &[10.0, 10.0], &[0.0, 0.0])
            .unwrap()
            .with_damping_layer(5)
            .unwrap();
        let eta = damping_profile(&grid, 7);
        for c in grid.physical_aabb().coord_iter() {
            assert_eq!(eta.view(&c), 0.0);
        }

        // Walk out of the box along axis 0
        let row = 8;
        let mut last = 0.0;
        for i in (0..5).rev() {
            let v = eta.view(&vector![i, row]);
            assert!(v > last, "{v} <= {last}");
            last = v;
        }
        assert_approx_eq!(
            f64,
            last,
            damping_amplitude() / 10.0,
            epsilon = 1e-12
        );

        // Corners take both axes
        let corner = eta.view(&vector![0, 0]);
        assert_approx_eq!(f64, corner, 2.0 * last, epsilon = 1e-12);
        let far = eta.view(&vector![15, 17]);
        assert_approx_eq!(f64, far, 2.0 * last, epsilon = 1e-12);
    }

    #[test]
    fn no_layer() {
        let grid = Grid::<1>::from_spacing(&[6], &[1.0], &[0.0]).unwrap();
        let eta = damping_profile(&grid, 3);
        assert!(eta.buffer().iter().all(|v| *v == 0.0));
    }
}
