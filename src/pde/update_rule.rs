use crate::domain::*;
use crate::error::*;
use crate::pde::*;
use crate::util::*;

/// One term of the update rule, reading a resident level.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RuleTap<const GRID_DIMENSION: usize> {
    /// Index into the past levels, oldest first.
    pub level: usize,
    pub offset: Coord<GRID_DIMENSION>,
    pub linear_offset: isize,
    pub weight: f64,
}

#[derive(Clone, Debug)]
struct TapGroup<const GRID_DIMENSION: usize> {
    coefficient: Coefficient,
    taps: Vec<RuleTap<GRID_DIMENSION>>,
}

/// Explicit update, the next level value at a point is
/// `sum_g c_g(x) sum_taps w u / sum_k c_k(x) w_k`
/// where the denominator collects the center taps of the next level.
#[derive(Clone, Debug)]
pub struct UpdateRule<const GRID_DIMENSION: usize> {
    pde: Pde<GRID_DIMENSION>,
    dt: f64,
    aabb: AABB<GRID_DIMENSION>,
    denominator: Vec<(Coefficient, f64)>,
    groups: Vec<TapGroup<GRID_DIMENSION>>,
    slopes: Bounds<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> UpdateRule<GRID_DIMENSION> {
    /// Discretize `pde` with time step `dt` and solve for the next level.
    /// Parameter fields must cover `aabb`.
    pub fn derive(
        pde: Pde<GRID_DIMENSION>,
        dt: f64,
        aabb: AABB<GRID_DIMENSION>,
    ) -> Result<Self> {
        let taps = pde.discretize(dt)?;
        Self::from_taps(pde, &taps, dt, aabb)
    }

    /// Solve an arbitrary discrete equation `sum(taps) = 0` for the next
    /// level at offset zero. Next level taps anywhere else would make the
    /// scheme implicit and are rejected.
    pub fn from_taps(
        pde: Pde<GRID_DIMENSION>,
        taps: &[Tap<GRID_DIMENSION>],
        dt: f64,
        aabb: AABB<GRID_DIMENSION>,
    ) -> Result<Self> {
        pde.mass().check("mass", &aabb, true)?;
        if let Some(damping) = pde.damping() {
            damping.check("damping", &aabb, false)?;
        }

        let time_order = pde.time_order() as i32;
        let mut denominator: Vec<(Coefficient, f64)> = Vec::new();
        let mut groups: Vec<TapGroup<GRID_DIMENSION>> = Vec::new();
        let mut slopes = Bounds::zero();
        for tap in taps {
            if tap.weight == 0.0 {
                continue;
            }
            if tap.level == TimeLevel::Next {
                if tap.offset != Coord::<GRID_DIMENSION>::zero() {
                    return Err(Error::Configuration(format!(
                        "implicit scheme, next level tap at offset {:?}",
                        tap.offset.as_slice()
                    )));
                }
                match denominator
                    .iter_mut()
                    .find(|(c, _)| *c == tap.coefficient)
                {
                    Some((_, w)) => *w += tap.weight,
                    None => denominator.push((tap.coefficient, tap.weight)),
                }
                continue;
            }

            let level = time_order - 1 + tap.level.shift();
            if level < 0 {
                return Err(Error::Configuration(format!(
                    "{:?} level is not resident for time order {time_order}",
                    tap.level
                )));
            }
            for d in 0..GRID_DIMENSION {
                let o = tap.offset[d];
                if o > 0 {
                    slopes[(d, 1)] = slopes[(d, 1)].max(o);
                } else {
                    slopes[(d, 0)] = slopes[(d, 0)].max(-o);
                }
            }

            // Moved to the right hand side
            let rule_tap = RuleTap {
                level: level as usize,
                offset: tap.offset,
                linear_offset: aabb.coord_offset_to_linear(&tap.offset),
                weight: -tap.weight,
            };
            let group = match groups
                .iter()
                .position(|g| g.coefficient == tap.coefficient)
            {
                Some(i) => &mut groups[i],
                None => {
                    groups.push(TapGroup {
                        coefficient: tap.coefficient,
                        taps: Vec::new(),
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };
            match group
                .taps
                .iter_mut()
                .find(|t| {
                    t.level == rule_tap.level && t.offset == rule_tap.offset
                })
            {
                Some(t) => t.weight += rule_tap.weight,
                None => group.taps.push(rule_tap),
            }
        }

        // Mass and unit terms carry the next level,
        // damping alone may vanish inside the physical box.
        let leading: f64 = denominator
            .iter()
            .filter(|(c, _)| *c != Coefficient::Damping)
            .map(|(_, w)| *w)
            .sum();
        if leading == 0.0 {
            return Err(Error::Configuration(
                "discrete equation has no next level term".to_string(),
            ));
        }

        Ok(UpdateRule {
            pde,
            dt,
            aabb,
            denominator,
            groups,
            slopes,
        })
    }

    pub fn pde(&self) -> &Pde<GRID_DIMENSION> {
        &self.pde
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn aabb(&self) -> &AABB<GRID_DIMENSION> {
        &self.aabb
    }

    pub fn time_order(&self) -> usize {
        self.pde.time_order()
    }

    /// Spatial reach of the rule.
    pub fn slopes(&self) -> Bounds<GRID_DIMENSION> {
        self.slopes
    }

    pub fn taps(
        &self,
    ) -> impl Iterator<Item = (Coefficient, &RuleTap<GRID_DIMENSION>)> {
        self.groups
            .iter()
            .flat_map(|g| g.taps.iter().map(move |t| (g.coefficient, t)))
    }

    #[inline]
    fn denominator(&self, linear_index: usize) -> f64 {
        self.denominator
            .iter()
            .map(|(c, w)| self.pde.coefficient(*c, linear_index) * w)
            .sum()
    }

    /// Next level value at an interior point,
    /// every neighbor must be inside the box.
    #[inline]
    pub fn evaluate(
        &self,
        past: &[OwnedDomain<GRID_DIMENSION>],
        linear_index: usize,
    ) -> f64 {
        let mut numerator = 0.0;
        for group in &self.groups {
            let mut sum = 0.0;
            for tap in &group.taps {
                let i = (linear_index as isize + tap.linear_offset) as usize;
                sum += tap.weight * past[tap.level].buffer()[i];
            }
            numerator +=
                self.pde.coefficient(group.coefficient, linear_index) * sum;
        }
        numerator / self.denominator(linear_index)
    }

    /// Next level value anywhere in the box,
    /// neighbors outside are looked up through `bc`.
    pub fn evaluate_with_bc<BC: BCCheck<GRID_DIMENSION>>(
        &self,
        past: &[OwnedDomain<GRID_DIMENSION>],
        world_coord: &Coord<GRID_DIMENSION>,
        bc: &BC,
    ) -> f64 {
        let linear_index = self.aabb.coord_to_linear(world_coord);
        let mut numerator = 0.0;
        for group in &self.groups {
            let mut sum = 0.0;
            for tap in &group.taps {
                let n_world_coord = world_coord + tap.offset;
                sum += tap.weight
                    * gather_arg(bc, &past[tap.level], &n_world_coord);
            }
            numerator +=
                self.pde.coefficient(group.coefficient, linear_index) * sum;
        }
        numerator / self.denominator(linear_index)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::stencil::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn upwind_rule() {
        // u+ = u - c dt / h (u - u_left)
        let (c, h, dt) = (2.0, 0.5, 0.1);
        let pde = Pde::<1>::convection(&vector![c], 1, &vector![h]).unwrap();
        let aabb = AABB::new(matrix![0, 9]);
        let rule = UpdateRule::derive(pde, dt, aabb).unwrap();
        assert_eq!(rule.slopes(), matrix![1, 0]);

        let mut current = OwnedDomain::new(aabb);
        current.par_set_values(|x| (x[0] * x[0]) as f64, 4);
        let past = [current];
        let courant = c * dt / h;
        for i in 1..10 {
            let u = (i * i) as f64;
            let ul = ((i - 1) * (i - 1)) as f64;
            let expected = u - courant * (u - ul);
            assert_approx_eq!(
                f64,
                rule.evaluate(&past, i as usize),
                expected,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn damped_wave_rule() {
        // m (u+ - 2u + u-) / dt^2 + eta (u+ - u-) / 2dt = L u
        let (m, eta, dt) = (0.5, 3.0, 0.1);
        let pde = Pde::<1>::wave(
            Parameter::Constant(m),
            Some(Parameter::Constant(eta)),
            2,
            &vector![1.0],
        )
        .unwrap();
        let aabb = AABB::new(matrix![0, 4]);
        let rule = UpdateRule::derive(pde, dt, aabb).unwrap();

        let mut previous = OwnedDomain::new(aabb);
        previous.par_set_values(|x| 0.1 * x[0] as f64, 2);
        let mut current = OwnedDomain::new(aabb);
        current.par_set_values(|x| (x[0] * x[0]) as f64, 2);
        let past = [previous, current];

        let i = 2usize;
        let u = 4.0;
        let um = 0.2;
        let lap = 1.0 - 2.0 * 4.0 + 9.0;
        let a = m / (dt * dt);
        let b = eta / (2.0 * dt);
        let expected = (lap + 2.0 * a * u - a * um + b * um) / (a + b);
        assert_approx_eq!(
            f64,
            rule.evaluate(&past, i),
            expected,
            epsilon = 1e-9
        );

        // Away from the boundary lookups agree with the interior path
        let bc = ConstantCheck::new(0.0, aabb);
        assert_approx_eq!(
            f64,
            rule.evaluate_with_bc(&past, &vector![2], &bc),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn boundary_lookups() {
        let pde = Pde::<1>::diffusion(1.0, 2, &vector![1.0]).unwrap();
        let aabb = AABB::new(matrix![0, 4]);
        let rule = UpdateRule::derive(pde, 0.25, aabb).unwrap();
        let mut current = OwnedDomain::new(aabb);
        current.par_set_values(|x| x[0] as f64, 2);
        let past = [current];

        // u + dt (u_l - 2u + u_r), left neighbor is -1
        let ghost = ConstantCheck::new(-1.0, aabb);
        assert_approx_eq!(
            f64,
            rule.evaluate_with_bc(&past, &vector![0], &ghost),
            0.0 + 0.25 * (-1.0 - 0.0 + 1.0)
        );

        // left neighbor wraps to 4
        let periodic = PeriodicCheck::new(aabb);
        assert_approx_eq!(
            f64,
            rule.evaluate_with_bc(&past, &vector![0], &periodic),
            0.25 * (4.0 + 1.0)
        );
    }

    #[test]
    fn rejects_implicit_taps() {
        let pde = Pde::<1>::diffusion(1.0, 2, &vector![1.0]).unwrap();
        let aabb = AABB::new(matrix![0, 4]);
        let mut taps = pde.discretize(0.1).unwrap();
        taps.push(Tap {
            level: TimeLevel::Next,
            offset: vector![1],
            weight: 1.0,
            coefficient: Coefficient::Unit,
        });
        assert!(matches!(
            UpdateRule::from_taps(pde.clone(), &taps, 0.1, aabb),
            Err(Error::Configuration(_))
        ));

        let previous = [Tap {
            level: TimeLevel::Previous,
            offset: vector![0],
            weight: 1.0,
            coefficient: Coefficient::Unit,
        }];
        assert!(
            UpdateRule::from_taps(pde.clone(), &previous, 0.1, aabb).is_err()
        );

        // Nothing to solve for
        let spatial_only: Vec<_> = taps
            .iter()
            .filter(|t| t.level == TimeLevel::Current)
            .copied()
            .collect();
        assert!(UpdateRule::from_taps(pde, &spatial_only, 0.1, aabb).is_err());
    }

    #[test]
    fn rejects_mismatched_fields() {
        let aabb = AABB::new(matrix![0, 4]);
        let mass = Parameter::Field(OwnedDomain::new(AABB::new(matrix![0, 5])));
        let spatial = LinearStencil::<1>::laplacian(2, &vector![1.0]).unwrap();
        let pde = Pde::new(2, spatial, mass, None).unwrap();
        assert!(UpdateRule::derive(pde, 0.1, aabb).is_err());
    }
}
