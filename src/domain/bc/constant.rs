use crate::domain::bc::BCCheck;
use crate::domain::DomainView;
use crate::util::*;

/// Everything outside `aabb` reads as `value`.
pub struct ConstantCheck<const GRID_DIMENSION: usize> {
    value: f64,
    aabb: AABB<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> ConstantCheck<GRID_DIMENSION> {
    pub fn new(value: f64, aabb: AABB<GRID_DIMENSION>) -> Self {
        ConstantCheck { value, aabb }
    }
}

impl<const GRID_DIMENSION: usize> BCCheck<GRID_DIMENSION>
    for ConstantCheck<GRID_DIMENSION>
{
    fn check<DomainType: DomainView<GRID_DIMENSION>>(
        &self,
        world_coord: &Coord<GRID_DIMENSION>,
        _domain: &DomainType,
    ) -> Option<f64> {
        if self.aabb.contains(world_coord) {
            None
        } else {
            Some(self.value)
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::domain::OwnedDomain;
    use float_cmp::assert_approx_eq;

    #[test]
    fn constant_check_test() {
        let aabb = AABB::new(matrix![0, 9]);
        let mut domain = OwnedDomain::new(aabb);
        domain.par_set_values(|c| c[0] as f64, 4);
        let bc = ConstantCheck::new(-1.0, aabb);
        for c in aabb.coord_iter() {
            assert_eq!(bc.check(&c, &domain), None);
        }

        let v = bc.check(&vector![-1], &domain).unwrap();
        assert_approx_eq!(f64, v, -1.0);

        let v = bc.check(&vector![10], &domain).unwrap();
        assert_approx_eq!(f64, v, -1.0);
    }
}
