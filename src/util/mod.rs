pub use nalgebra::{matrix, vector};
pub use num_traits::{Num, One, Zero};

mod aabb;
pub mod indexing;
pub use aabb::*;

/// Integer grid coordinate, world (computational box) indexing.
pub type Coord<const GRID_DIMENSION: usize> =
    nalgebra::SVector<i32, { GRID_DIMENSION }>;

/// Per axis (min, max) pairs, column 0 is min and column 1 is max.
pub type Bounds<const GRID_DIMENSION: usize> =
    nalgebra::SMatrix<i32, { GRID_DIMENSION }, 2>;

/// Physical position or per axis physical quantity (spacing, extent).
pub type Position<const GRID_DIMENSION: usize> =
    nalgebra::SVector<f64, { GRID_DIMENSION }>;
