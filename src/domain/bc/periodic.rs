use crate::domain::bc::BCCheck;
use crate::domain::DomainView;
use crate::util::*;

/// Neighbors outside `aabb` wrap around to the opposite side.
pub struct PeriodicCheck<const GRID_DIMENSION: usize> {
    aabb: AABB<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> PeriodicCheck<GRID_DIMENSION> {
    pub fn new(aabb: AABB<GRID_DIMENSION>) -> Self {
        PeriodicCheck { aabb }
    }
}

impl<const GRID_DIMENSION: usize> BCCheck<GRID_DIMENSION>
    for PeriodicCheck<GRID_DIMENSION>
{
    fn check<DomainType: DomainView<GRID_DIMENSION>>(
        &self,
        world_coord: &Coord<GRID_DIMENSION>,
        domain: &DomainType,
    ) -> Option<f64> {
        let p_coord = self.aabb.periodic_coord(world_coord);
        if p_coord != *world_coord {
            return Some(domain.view(&p_coord));
        }
        None
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::domain::OwnedDomain;
    use float_cmp::assert_approx_eq;

    #[test]
    fn periodic_check_test() {
        let aabb = AABB::new(matrix![0, 10]);
        let mut domain = OwnedDomain::new(aabb);
        domain.par_set_values(|c| c[0] as f64, 3);
        let bc = PeriodicCheck::new(aabb);
        for c in aabb.coord_iter() {
            assert_eq!(bc.check(&c, &domain), None);
        }

        {
            let v = bc.check(&vector![-1], &domain).unwrap();
            assert_approx_eq!(f64, v, 10.0);
        }

        {
            let v = bc.check(&vector![11], &domain).unwrap();
            assert_approx_eq!(f64, v, 0.0);
        }
    }

    #[test]
    fn periodic_check_2d() {
        let aabb = AABB::new(matrix![0, 9; 0, 9]);
        let mut domain = OwnedDomain::new(aabb);
        domain.par_set_values(|c| (c[0] + 3 * c[1]) as f64, 7);
        let bc = PeriodicCheck::new(aabb);
        let v = bc.check(&vector![9, 10], &domain).unwrap();
        assert_approx_eq!(f64, v, 9.0);
        let v = bc.check(&vector![-2, 9], &domain).unwrap();
        assert_approx_eq!(f64, v, (8 + 27) as f64);
    }
}
