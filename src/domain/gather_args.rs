use crate::domain::*;
use crate::util::*;

/// Value of `input` at a neighbor coordinate,
/// coordinates outside the domain go through the boundary check.
#[inline]
pub fn gather_arg<BC, DomainType, const GRID_DIMENSION: usize>(
    bc: &BC,
    input: &DomainType,
    world_coord: &Coord<GRID_DIMENSION>,
) -> f64
where
    BC: BCCheck<GRID_DIMENSION>,
    DomainType: DomainView<GRID_DIMENSION>,
{
    bc.check(world_coord, input)
        .unwrap_or_else(|| input.view(world_coord))
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn offsets() -> [Coord<2>; 5] {
        [
            vector![0, -1],
            vector![0, 1],
            vector![1, 0],
            vector![-1, 0],
            vector![0, 0],
        ]
    }

    fn domain() -> OwnedDomain<2> {
        let bound = AABB::new(matrix![0, 9; 0, 9]);
        let mut domain = OwnedDomain::new(bound);
        domain.par_set_values(|coord| (coord[0] + 3 * coord[1]) as f64, 7);
        domain
    }

    fn gather(
        bc: &impl BCCheck<2>,
        domain: &OwnedDomain<2>,
        world_coord: Coord<2>,
    ) -> Vec<f64> {
        offsets()
            .iter()
            .map(|n_i| gather_arg(bc, domain, &(world_coord + n_i)))
            .collect()
    }

    #[test]
    fn gather_arg_test_const() {
        let domain = domain();
        let bc = ConstantCheck::new(-4.0, *domain.aabb());
        let r = gather(&bc, &domain, vector![9, 9]);
        let e = [
            (9 + 3 * 8) as f64,
            -4.0,
            -4.0,
            (8 + 3 * 9) as f64,
            (9 + 3 * 9) as f64,
        ];
        for n in 0..r.len() {
            assert_approx_eq!(f64, r[n], e[n]);
        }
    }

    #[test]
    fn gather_arg_test_periodic() {
        let domain = domain();
        let bc = PeriodicCheck::new(*domain.aabb());
        let r = gather(&bc, &domain, vector![9, 9]);
        let e = [
            (9 + 3 * 8) as f64,
            9.0,
            (3 * 9) as f64,
            (8 + 3 * 9) as f64,
            (9 + 3 * 9) as f64,
        ];
        for n in 0..r.len() {
            assert_approx_eq!(f64, r[n], e[n]);
        }
    }
}
