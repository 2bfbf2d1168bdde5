use crate::util::indexing::*;
use crate::util::*;

/// Axis Aligned Bounding Box (AABB) for coordinate types.
/// Each instance is inclusive of both corners.
/// This class is responsible for alot of indexing operations,
/// where we map between a linear buffer and coordinates.
#[derive(Hash, Debug, Copy, Clone, Eq, PartialEq)]
pub struct AABB<const DIMENSION: usize> {
    pub bounds: Bounds<DIMENSION>,
}

impl<const GRID_DIMENSION: usize> std::fmt::Display for AABB<GRID_DIMENSION> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> Result<(), std::fmt::Error> {
        write!(f, "{:?}", self.bounds)
    }
}

impl<const DIMENSION: usize> AABB<DIMENSION> {
    /// Create AABB from raw bounds.
    #[inline]
    pub fn new(bounds: Bounds<DIMENSION>) -> Self {
        AABB { bounds }
    }

    /// Create AABB from corners.
    pub fn from_mm(min: Coord<DIMENSION>, max: Coord<DIMENSION>) -> Self {
        let result = AABB {
            bounds: Bounds::from_columns(&[min, max]),
        };
        debug_assert!(result.check_validity());
        result
    }

    /// Create AABB with min corner at the origin
    /// and the given number of points per axis.
    pub fn from_exclusive(sizes: Coord<DIMENSION>) -> Self {
        Self::from_mm(Coord::zero(), sizes.add_scalar(-1))
    }

    /// Moving min to the origin, returns the exclusie size in each direction
    /// i.e. [0, 9]  would have exclusive size of 10.
    pub fn exclusive_bounds(&self) -> Coord<DIMENSION> {
        (self.bounds.column(1) - self.bounds.column(0)).add_scalar(1)
    }

    /// Return the number of coordinates contained in the instance.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        real_buffer_size(&self.exclusive_bounds())
    }

    /// Return the linear index for a coord in the instance
    pub fn coord_to_linear(&self, coord: &Coord<DIMENSION>) -> usize {
        coord_to_linear(&(coord - self.min()), &self.exclusive_bounds())
    }

    /// Return the coordinate in the instance for a given linear index.
    pub fn linear_to_coord(&self, index: usize) -> Coord<DIMENSION> {
        linear_to_coord(index, &self.exclusive_bounds()) + self.min()
    }

    /// Check whether the instance contains a coordinate.
    pub fn contains(&self, coord: &Coord<DIMENSION>) -> bool {
        for d in 0..DIMENSION {
            if coord[d] < self.bounds[(d, 0)] || coord[d] > self.bounds[(d, 1)]
            {
                return false;
            }
        }
        true
    }

    /// Find the coord within bound assuming periodic boundary conditions.
    /// Assumes that coords are no more than one box away!
    pub fn periodic_coord(&self, coord: &Coord<DIMENSION>) -> Coord<DIMENSION> {
        let mut result = Coord::zero();
        for d in 0..DIMENSION {
            let di_raw = coord[d];
            result[d] = if di_raw < self.bounds[(d, 0)] {
                (self.bounds[(d, 1)] + 1) - (self.bounds[(d, 0)] - di_raw)
            } else if di_raw > self.bounds[(d, 1)] {
                self.bounds[(d, 0)] + (di_raw - self.bounds[(d, 1)] - 1)
            } else {
                di_raw
            }
        }
        result
    }

    /// Return min corner.
    pub fn min(&self) -> Coord<DIMENSION> {
        self.bounds.column(0).into()
    }

    /// Return max corner
    pub fn max(&self) -> Coord<DIMENSION> {
        self.bounds.column(1).into()
    }

    /// Check that max >= min
    pub fn check_validity(&self) -> bool {
        for d in 0..DIMENSION {
            if self.bounds[(d, 0)] > self.bounds[(d, 1)] {
                return false;
            }
        }
        true
    }

    /// Return iterator over contained coords
    /// in linear ordering.
    #[allow(clippy::needless_lifetimes)]
    pub fn coord_iter<'a>(
        &'a self,
    ) -> impl Iterator<Item = Coord<DIMENSION>> + use<'a, DIMENSION> {
        (0..self.buffer_size()).map(|i| self.linear_to_coord(i))
    }

    /// The box of cell min corners, i.e. every coord `c` where
    /// `c + 1` along each axis is still contained.
    pub fn cell_bounds(&self) -> Self {
        let mut cell_bounds = *self;
        cell_bounds
            .bounds
            .set_column(1, &cell_bounds.bounds.column(1).add_scalar(-1));
        cell_bounds
    }

    /// Shrink by stencil slopes, the result holds every coordinate
    /// whose stencil neighborhood is contained in the instance.
    /// Returns None if nothing remains.
    pub fn interior(&self, slopes: &Bounds<DIMENSION>) -> Option<Self> {
        let mut bounds = self.bounds;
        for d in 0..DIMENSION {
            bounds[(d, 0)] += slopes[(d, 0)];
            bounds[(d, 1)] -= slopes[(d, 1)];
        }
        let result = AABB::new(bounds);
        if result.check_validity() {
            Some(result)
        } else {
            None
        }
    }

    /// Translate neighbor offsets into linear buffer offsets.
    pub fn coord_offset_to_linear(
        &self,
        coord_offset: &Coord<DIMENSION>,
    ) -> isize {
        // highest dimension goes the fastest
        let exclusive_bounds = self.exclusive_bounds();
        let mut linear_offset = 0isize;
        let mut accumulator = 1isize;
        for d in (0..DIMENSION).rev() {
            linear_offset += coord_offset[d] as isize * accumulator;
            accumulator *= exclusive_bounds[d] as isize;
        }
        linear_offset
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn buffer_size_test() {
        {
            let a = AABB::new(matrix![0, 5]);
            assert_eq!(a.buffer_size(), 6);
        }

        {
            let dimensions = AABB::new(matrix![0, 5; 0, 7; 0, 9]);
            assert_eq!(dimensions.buffer_size(), 6 * 8 * 10);
        }

        {
            let dimensions = AABB::new(matrix![1, 6; 1, 8; 1, 10]);
            assert_eq!(dimensions.buffer_size(), 6 * 8 * 10);
        }

        {
            let from_sizes = AABB::from_exclusive(vector![4, 7]);
            assert_eq!(from_sizes, AABB::new(matrix![0, 3; 0, 6]));
        }
    }

    #[test]
    fn coord_to_linear_in_box_test() {
        let bb = AABB::new(matrix![0, 9; 0, 9; 0, 9]);
        let lin_1 = bb.coord_to_linear(&vector![5, 5, 5]);
        let lin_2 = coord_to_linear(&vector![5, 5, 5], &vector![10, 10, 10]);
        assert_eq!(lin_1, lin_2);
    }

    #[test]
    fn linear_to_coord_test() {
        {
            let bb = AABB::new(matrix![2, 8]);
            let c_1 = bb.linear_to_coord(5);
            assert_eq!(c_1, vector![7]);
        }

        {
            let a = AABB::new(matrix![1, 9]);
            assert_eq!(a.linear_to_coord(0), vector![1]);
        }

        {
            let bound = AABB::new(matrix![0, 9; 0, 9]);
            let c = vector![9, 8];
            let li = bound.coord_to_linear(&c);
            assert_eq!(c, bound.linear_to_coord(li));
        }
    }

    #[test]
    fn periodic_coord_test() {
        {
            let bound = AABB::new(matrix![0, 10; 0, 10]);
            assert_eq!(bound.periodic_coord(&vector![0, 0]), vector![0, 0]);
            assert_eq!(bound.periodic_coord(&vector![10, 10]), vector![10, 10]);
            assert_eq!(bound.periodic_coord(&vector![-1, 0]), vector![10, 0]);
            assert_eq!(bound.periodic_coord(&vector![0, -1]), vector![0, 10]);
            assert_eq!(bound.periodic_coord(&vector![11, 12]), vector![0, 1]);
        }

        {
            let bound = AABB::new(matrix![0, 100; 0, 100; 0, 100]);
            assert_eq!(
                bound.periodic_coord(&vector![-4, -19, 134]),
                vector![97, 82, 33]
            );
        }
    }

    #[test]
    fn interior_test() {
        let bound = AABB::new(matrix![0, 9; 0, 19]);
        {
            let slopes = matrix![1, 1; 2, 2];
            let interior = bound.interior(&slopes).unwrap();
            assert_eq!(interior, AABB::new(matrix![1, 8; 2, 17]));
        }

        // One sided stencil only loses the left side
        {
            let slopes = matrix![1, 0; 0, 0];
            let interior = bound.interior(&slopes).unwrap();
            assert_eq!(interior, AABB::new(matrix![1, 9; 0, 19]));
        }

        {
            let slopes = matrix![5, 5; 0, 0];
            assert!(bound.interior(&slopes).is_none());
        }
    }

    #[test]
    fn coord_offset_to_linear_test() {
        let bound = AABB::new(matrix![0, 9; 0, 19]);
        assert_eq!(bound.coord_offset_to_linear(&vector![0, 1]), 1);
        assert_eq!(bound.coord_offset_to_linear(&vector![1, 0]), 20);
        assert_eq!(bound.coord_offset_to_linear(&vector![-1, -2]), -22);

        let center = vector![4, 7];
        let offset = vector![-1, 3];
        let li = bound.coord_to_linear(&center) as isize
            + bound.coord_offset_to_linear(&offset);
        assert_eq!(li as usize, bound.coord_to_linear(&(center + offset)));
    }
}
