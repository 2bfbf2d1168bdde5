use super::*;
use crate::util::*;

/// Zero initialized buffer covering an AABB.
#[derive(Clone, Debug)]
pub struct OwnedDomain<const GRID_DIMENSION: usize> {
    aabb: AABB<GRID_DIMENSION>,
    buffer: Vec<f64>,
}

impl<const GRID_DIMENSION: usize> OwnedDomain<GRID_DIMENSION> {
    pub fn new(aabb: AABB<GRID_DIMENSION>) -> Self {
        let buffer = vec![0.0; aabb.buffer_size()];
        OwnedDomain { aabb, buffer }
    }

    /// Wrap existing values, `buffer` must be in the AABB's linear order.
    pub fn from_buffer(aabb: AABB<GRID_DIMENSION>, buffer: Vec<f64>) -> Self {
        debug_assert_eq!(buffer.len(), aabb.buffer_size());
        OwnedDomain { aabb, buffer }
    }

    pub fn into_buffer(self) -> Vec<f64> {
        self.buffer
    }
}

impl<const GRID_DIMENSION: usize> DomainView<GRID_DIMENSION>
    for OwnedDomain<GRID_DIMENSION>
{
    fn aabb(&self) -> &AABB<GRID_DIMENSION> {
        &self.aabb
    }

    fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    fn aabb_buffer_mut(&mut self) -> (&AABB<GRID_DIMENSION>, &mut [f64]) {
        (&self.aabb, &mut self.buffer)
    }

    #[track_caller]
    fn view(&self, world_coord: &Coord<GRID_DIMENSION>) -> f64 {
        debug_assert!(
            self.aabb.contains(world_coord),
            "{:?} does not contain {:?}",
            self.aabb,
            world_coord
        );
        let index = self.aabb.coord_to_linear(world_coord);
        self.buffer[index]
    }

    #[track_caller]
    fn set_coord(&mut self, world_coord: &Coord<GRID_DIMENSION>, value: f64) {
        debug_assert!(
            self.aabb.contains(world_coord),
            "{:?} does not contain {:?}",
            self.aabb,
            world_coord
        );
        let index = self.aabb.coord_to_linear(world_coord);
        self.buffer[index] = value;
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn swap_test() {
        let mut a = OwnedDomain::new(AABB::new(matrix![0, 1]));
        let mut b = OwnedDomain::new(AABB::new(matrix![0, 1]));
        let a_ptr = a.buffer().as_ptr();
        let b_ptr = b.buffer().as_ptr();
        std::mem::swap(&mut a, &mut b);
        assert_eq!(a_ptr, b.buffer().as_ptr());
        assert_eq!(b_ptr, a.buffer().as_ptr());
    }

    #[test]
    fn set_and_view() {
        let mut a = OwnedDomain::new(AABB::new(matrix![2, 5; -1, 3]));
        assert!(a.buffer().iter().all(|v| *v == 0.0));
        a.set_coord(&vector![3, -1], 4.5);
        assert_eq!(a.view(&vector![3, -1]), 4.5);
        assert_eq!(a.buffer()[5], 4.5);
    }
}
