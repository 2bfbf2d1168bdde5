//! The time marching loop.
//!
//! Each step runs, in order,
//! 1. source injection into the next level,
//! 2. the update rule on the interior box,
//! 3. the boundary condition on the frame around it,
//! 4. receiver sampling of the next level,
//! 5. level rotation.
//!
//! Steps 2 and 3 only read resident past levels and only write the
//! next level, so every point is independent within a step.

use crate::domain::*;
use crate::error::*;
use crate::field::TimeField;
use crate::grid::Grid;
use crate::pde::*;
use crate::sparse::*;
use crate::stability::{self, StabilityPolicy};
use crate::util::*;
use rayon::prelude::*;

/// What happens on the frame, the points whose stencil reaches
/// outside the computational box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Boundary {
    /// Frame points are held at a fixed value.
    Dirichlet(f64),
    /// Neighbors wrap around the box.
    Periodic,
    /// Neighbors outside the box read as a fixed value.
    Ghost(f64),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OperatorParameters {
    /// Buffer values per rayon task.
    pub chunk_size: usize,
    /// Steps between non-finite checks of the field.
    pub check_interval: usize,
    /// Steps between progress log lines, 0 disables them.
    pub report_period: usize,
    pub stability: StabilityPolicy,
}

impl Default for OperatorParameters {
    fn default() -> Self {
        OperatorParameters {
            chunk_size: 1024,
            check_interval: 50,
            report_period: 0,
            stability: StabilityPolicy::Reject,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub simulated_time: f64,
    /// Largest absolute value of the final current level.
    pub max_abs: f64,
}

pub struct Operator<const GRID_DIMENSION: usize> {
    rule: UpdateRule<GRID_DIMENSION>,
    boundary: Boundary,
    params: OperatorParameters,
    interior: Option<AABB<GRID_DIMENSION>>,
    frame: Vec<(usize, Coord<GRID_DIMENSION>)>,
    critical_dt: f64,
}

impl<const GRID_DIMENSION: usize> Operator<GRID_DIMENSION> {
    pub fn new(
        grid: &Grid<GRID_DIMENSION>,
        pde: Pde<GRID_DIMENSION>,
        dt: f64,
        boundary: Boundary,
        params: OperatorParameters,
    ) -> Result<Self> {
        if params.chunk_size == 0 || params.check_interval == 0 {
            return Err(Error::Configuration(
                "chunk size and check interval must be positive".to_string(),
            ));
        }
        let aabb = grid.aabb();
        let rule = UpdateRule::derive(pde, dt, aabb)?;
        let critical_dt = stability::critical_dt(rule.pde());

        let slopes = rule.slopes();
        if boundary == Boundary::Periodic {
            let sizes = aabb.exclusive_bounds();
            for d in 0..GRID_DIMENSION {
                if slopes[(d, 0)].max(slopes[(d, 1)]) > sizes[d] {
                    return Err(Error::Configuration(format!(
                        "stencil reach {} exceeds periodic axis {d} of size {}",
                        slopes[(d, 0)].max(slopes[(d, 1)]),
                        sizes[d]
                    )));
                }
            }
        }

        let interior = aabb.interior(&slopes);
        let frame = aabb
            .coord_iter()
            .enumerate()
            .filter(|(_, c)| interior.map_or(true, |i| !i.contains(c)))
            .collect();

        Ok(Operator {
            rule,
            boundary,
            params,
            interior,
            frame,
            critical_dt,
        })
    }

    pub fn dt(&self) -> f64 {
        self.rule.dt()
    }

    /// Largest stable time step for this operator's equation.
    pub fn critical_dt(&self) -> f64 {
        self.critical_dt
    }

    pub fn rule(&self) -> &UpdateRule<GRID_DIMENSION> {
        &self.rule
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn params(&self) -> &OperatorParameters {
        &self.params
    }

    pub fn interior(&self) -> Option<&AABB<GRID_DIMENSION>> {
        self.interior.as_ref()
    }

    /// Advance `field` by `nt` steps.
    ///
    /// The field keeps whatever state it has,
    /// reset it first to start from rest.
    /// Receivers are cleared and record exactly `nt` rows.
    pub fn apply(
        &self,
        field: &mut TimeField<GRID_DIMENSION>,
        source: Option<&Source<GRID_DIMENSION>>,
        mut receivers: Option<&mut Receivers<GRID_DIMENSION>>,
        nt: usize,
    ) -> Result<RunSummary> {
        if field.time_order() != self.rule.time_order() {
            return Err(Error::Configuration(format!(
                "field has time order {}, equation has {}",
                field.time_order(),
                self.rule.time_order()
            )));
        }
        if field.current().aabb() != self.rule.aabb() {
            return Err(Error::Configuration(format!(
                "field covers {}, operator covers {}",
                field.current().aabb(),
                self.rule.aabb()
            )));
        }
        let sparse_boxes = source
            .map(|s| ("source", s.points().aabb()))
            .into_iter()
            .chain(
                receivers
                    .as_deref()
                    .map(|r| ("receivers", r.points().aabb())),
            );
        for (name, aabb) in sparse_boxes {
            if aabb != self.rule.aabb() {
                return Err(Error::Configuration(format!(
                    "{name} built on {aabb}, operator covers {}",
                    self.rule.aabb()
                )));
            }
        }
        let dt = self.rule.dt();
        stability::check_timestep(dt, self.critical_dt, self.params.stability)?;

        log::info!(
            "running {nt} steps, dt = {dt}, critical dt = {}, boundary {:?}",
            self.critical_dt,
            self.boundary
        );

        if let Some(r) = receivers.as_deref_mut() {
            r.reset(nt);
        }

        let chunk_size = self.params.chunk_size;
        for t in 0..nt {
            profiling::scope!("operator::step");
            {
                let (past, next) = field.split_levels_mut();
                if let Some(s) = source {
                    s.inject(t, next);
                }
                self.apply_interior(past, next);
                self.apply_boundary(past, next);
                if let Some(r) = receivers.as_deref_mut() {
                    r.record(t, &*next);
                }
            }
            field.rotate(chunk_size);

            let step = t + 1;
            if (step % self.params.check_interval == 0 || step == nt)
                && !field.current().par_all_finite(chunk_size)
            {
                log::error!("non-finite values after step {step}");
                return Err(Error::NonFinite { step });
            }
            let period = self.params.report_period;
            if period > 0 && step % period == 0 {
                log::debug!(
                    "step {step}/{nt}, t = {:.6}, max |u| = {:e}",
                    step as f64 * dt,
                    field.current().par_max_abs(chunk_size)
                );
            }
        }

        Ok(RunSummary {
            steps: nt,
            simulated_time: nt as f64 * dt,
            max_abs: field.current().par_max_abs(chunk_size),
        })
    }

    fn apply_interior(
        &self,
        past: &[OwnedDomain<GRID_DIMENSION>],
        next: &mut OwnedDomain<GRID_DIMENSION>,
    ) {
        profiling::scope!("operator::interior");
        let Some(interior) = self.interior.as_ref() else {
            return;
        };
        let rule = &self.rule;
        next.par_modify_access(self.params.chunk_size).for_each(
            |mut d: DomainChunk<'_, GRID_DIMENSION>| {
                d.indexed_iter_mut().for_each(
                    |(linear_index, world_coord, value_mut)| {
                        if interior.contains(&world_coord) {
                            *value_mut += rule.evaluate(past, linear_index);
                        }
                    },
                )
            },
        );
    }

    fn apply_boundary(
        &self,
        past: &[OwnedDomain<GRID_DIMENSION>],
        next: &mut OwnedDomain<GRID_DIMENSION>,
    ) {
        profiling::scope!("operator::boundary");
        let aabb = *self.rule.aabb();
        match self.boundary {
            Boundary::Dirichlet(value) => {
                let buffer = next.buffer_mut();
                for (linear_index, _) in &self.frame {
                    buffer[*linear_index] = value;
                }
            }
            Boundary::Periodic => {
                self.add_frame(past, next, &PeriodicCheck::new(aabb))
            }
            Boundary::Ghost(value) => {
                self.add_frame(past, next, &ConstantCheck::new(value, aabb))
            }
        }
    }

    fn add_frame<BC: BCCheck<GRID_DIMENSION>>(
        &self,
        past: &[OwnedDomain<GRID_DIMENSION>],
        next: &mut OwnedDomain<GRID_DIMENSION>,
        bc: &BC,
    ) {
        let values: Vec<f64> = self
            .frame
            .par_iter()
            .map(|(_, world_coord)| {
                self.rule.evaluate_with_bc(past, world_coord, bc)
            })
            .collect();
        let buffer = next.buffer_mut();
        for ((linear_index, _), value) in self.frame.iter().zip(values) {
            buffer[*linear_index] += value;
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn diffusion_operator(boundary: Boundary) -> (Grid<1>, Operator<1>) {
        let grid = Grid::<1>::from_spacing(&[8], &[1.0], &[0.0]).unwrap();
        let pde = Pde::diffusion(1.0, 2, &grid.spacing()).unwrap();
        let params = OperatorParameters {
            chunk_size: 3,
            ..Default::default()
        };
        let op = Operator::new(&grid, pde, 0.25, boundary, params).unwrap();
        (grid, op)
    }

    #[test]
    fn interior_and_frame() {
        let (_, op) = diffusion_operator(Boundary::Dirichlet(0.0));
        assert_eq!(op.interior(), Some(&AABB::new(matrix![1, 6])));
        assert_eq!(op.frame.len(), 2);
        assert_approx_eq!(f64, op.critical_dt(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn dirichlet_holds_frame() {
        let (grid, op) = diffusion_operator(Boundary::Dirichlet(2.0));
        let mut field = TimeField::new(&grid, 1, false).unwrap();
        field.set_initial(|_| 2.0, 3);
        let summary = op.apply(&mut field, None, None, 10).unwrap();
        assert_eq!(summary.steps, 10);
        assert_approx_eq!(f64, summary.simulated_time, 2.5);
        for v in field.current().buffer() {
            assert_approx_eq!(f64, *v, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn periodic_conserves_mass() {
        let (grid, op) = diffusion_operator(Boundary::Periodic);
        let mut field = TimeField::new(&grid, 1, false).unwrap();
        field.set_initial(|c| if c[0] == 0 { 8.0 } else { 0.0 }, 3);
        op.apply(&mut field, None, None, 80).unwrap();
        let total: f64 = field.current().buffer().iter().sum();
        assert_approx_eq!(f64, total, 8.0, epsilon = 1e-9);
        for v in field.current().buffer() {
            assert_approx_eq!(f64, *v, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn ghost_reads_outside_value() {
        let (grid, op) = diffusion_operator(Boundary::Ghost(1.0));
        let mut field = TimeField::new(&grid, 1, false).unwrap();
        op.apply(&mut field, None, None, 1).unwrap();
        // only the end points see the ghost neighbors
        let b = field.current().buffer();
        assert_approx_eq!(f64, b[0], 0.25);
        assert_approx_eq!(f64, b[7], 0.25);
        assert_approx_eq!(f64, b[3], 0.0);
    }

    #[test]
    fn rejects_unstable_and_mismatched() {
        let grid = Grid::<1>::from_spacing(&[8], &[1.0], &[0.0]).unwrap();
        let pde = Pde::diffusion(1.0, 2, &grid.spacing()).unwrap();
        let op = Operator::new(
            &grid,
            pde.clone(),
            1.0,
            Boundary::Periodic,
            OperatorParameters::default(),
        )
        .unwrap();
        let mut field = TimeField::new(&grid, 1, false).unwrap();
        assert!(matches!(
            op.apply(&mut field, None, None, 1),
            Err(Error::UnstableTimestep { .. })
        ));

        let mut wrong_order = TimeField::new(&grid, 2, false).unwrap();
        let op = Operator::new(
            &grid,
            pde,
            0.1,
            Boundary::Periodic,
            OperatorParameters::default(),
        )
        .unwrap();
        assert!(matches!(
            op.apply(&mut wrong_order, None, None, 1),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn rejects_sparse_points_from_other_grids() {
        let (grid, op) = diffusion_operator(Boundary::Dirichlet(0.0));
        let wide = Grid::<1>::from_spacing(&[101], &[1.0], &[0.0]).unwrap();
        let axis = TimeAxis::new(0.0, 0.25, 4).unwrap();
        let source = Source::from_wavelet(
            &wide,
            vec![vector![90.0]],
            &RickerWavelet::new(1.0),
            1.0,
            &axis,
            Parameter::Constant(1.0),
        )
        .unwrap();
        let mut field = TimeField::new(&grid, 1, false).unwrap();
        assert!(matches!(
            op.apply(&mut field, Some(&source), None, 4),
            Err(Error::Configuration(_))
        ));

        let mut receivers = Receivers::new(&wide, vec![vector![90.0]]).unwrap();
        assert!(matches!(
            op.apply(&mut field, None, Some(&mut receivers), 4),
            Err(Error::Configuration(_))
        ));

        // a scale field must cover the same box as the points
        let points = SparsePoints::new(&grid, vec![vector![3.5]]).unwrap();
        let scale = Parameter::Field(OwnedDomain::new(wide.aabb()));
        assert!(matches!(
            Source::new(points, Traces::new(4, 1), scale),
            Err(Error::Configuration(_))
        ));

        let local = Source::from_wavelet(
            &grid,
            vec![vector![3.5]],
            &RickerWavelet::new(1.0),
            1.0,
            &axis,
            Parameter::Constant(1.0),
        )
        .unwrap();
        assert!(op.apply(&mut field, Some(&local), None, 4).is_ok());
    }
}
