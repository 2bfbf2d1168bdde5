//! Domain Initialization
//!
//! Utilities for common initial states in physical coordinates.
//! Use `DomainView::par_set_values` for custom needs,
//! then `TimeField::set_initial_from`.

use crate::domain::*;
use crate::grid::Grid;
use crate::util::*;
use rand::prelude::*;
use rayon::prelude::*;

/// Uniform random values in `[0, max_val)`.
pub fn rand<
    const GRID_DIMENSION: usize,
    DomainType: DomainView<GRID_DIMENSION>,
>(
    domain: &mut DomainType,
    max_val: f64,
    chunk_size: usize,
) {
    domain.par_modify_access(chunk_size).for_each(
        |mut d: DomainChunk<'_, GRID_DIMENSION>| {
            let mut rng = rand::thread_rng();
            d.coord_iter_mut().for_each(|(_, value_mut)| {
                *value_mut = rng.gen::<f64>() * max_val;
            })
        },
    );
}

/// `value` for points inside the closed box `[min, max]`,
/// `background` elsewhere.
pub fn box_pulse<
    const GRID_DIMENSION: usize,
    DomainType: DomainView<GRID_DIMENSION>,
>(
    domain: &mut DomainType,
    grid: &Grid<GRID_DIMENSION>,
    min: &Position<GRID_DIMENSION>,
    max: &Position<GRID_DIMENSION>,
    value: f64,
    background: f64,
    chunk_size: usize,
) {
    domain.par_modify_access(chunk_size).for_each(
        |mut d: DomainChunk<'_, GRID_DIMENSION>| {
            d.coord_iter_mut().for_each(|(world_coord, value_mut)| {
                let p = grid.position(&world_coord);
                let inside = (0..GRID_DIMENSION)
                    .all(|a| p[a] >= min[a] && p[a] <= max[a]);
                *value_mut = if inside { value } else { background };
            })
        },
    );
}

/// `amplitude * exp(-|x - center|^2 / (2 sigma^2))`
pub fn gaussian<
    const GRID_DIMENSION: usize,
    DomainType: DomainView<GRID_DIMENSION>,
>(
    domain: &mut DomainType,
    grid: &Grid<GRID_DIMENSION>,
    center: &Position<GRID_DIMENSION>,
    sigma: f64,
    amplitude: f64,
    chunk_size: usize,
) {
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
    domain.par_modify_access(chunk_size).for_each(
        |mut d: DomainChunk<'_, GRID_DIMENSION>| {
            d.coord_iter_mut().for_each(|(world_coord, value_mut)| {
                let r_sq =
                    (grid.position(&world_coord) - center).norm_squared();
                *value_mut = amplitude * (-r_sq * inv_two_sigma_sq).exp();
            })
        },
    );
}
