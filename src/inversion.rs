//! Misfit and gradient for full waveform inversion.
//!
//! Each shot is an independent forward run, an adjoint run driven by
//! the data residual, and a zero lag correlation of the two wavefields:
//! `g(x) = -sum_t u_tt(x, t) v(x, t)`.
//! Shots are folded together by summation.

use crate::acoustic::AcousticSolver;
use crate::domain::*;
use crate::error::*;
use crate::field::TimeField;
use crate::sparse::Traces;
use crate::util::*;
use rayon::prelude::*;

/// Observed data for one source position.
#[derive(Clone, Debug)]
pub struct Shot<const GRID_DIMENSION: usize> {
    pub source_position: Position<GRID_DIMENSION>,
    pub observed: Traces,
}

/// Summed misfit and gradient over the computational box.
#[derive(Clone, Debug)]
pub struct GradientResult<const GRID_DIMENSION: usize> {
    pub misfit: f64,
    pub gradient: OwnedDomain<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> GradientResult<GRID_DIMENSION> {
    pub fn zero(aabb: AABB<GRID_DIMENSION>) -> Self {
        GradientResult {
            misfit: 0.0,
            gradient: OwnedDomain::new(aabb),
        }
    }

    /// Sum of two partial results.
    pub fn combine(mut self, other: Self, chunk_size: usize) -> Self {
        self.misfit += other.misfit;
        crate::par_slice::add_assign(
            self.gradient.buffer_mut(),
            other.gradient.buffer(),
            chunk_size,
        );
        self
    }
}

/// `1/2 sum (synthetic - observed)^2`
pub fn misfit(synthetic: &Traces, observed: &Traces) -> Result<f64> {
    Ok(synthetic.residual(observed)?.half_norm_squared())
}

/// Add `-sum_s u_tt(s) v(s)` into `gradient`.
///
/// `forward` and `adjoint` hold `nt + 1` snapshots each. Adjoint
/// snapshot `j` belongs to forward time `nt + 1 - j` since the adjoint
/// runs backwards in time, and `u_tt` is only defined for `1 <= s < nt`.
pub fn correlate<const GRID_DIMENSION: usize>(
    forward: &[OwnedDomain<GRID_DIMENSION>],
    adjoint: &[OwnedDomain<GRID_DIMENSION>],
    dt: f64,
    gradient: &mut OwnedDomain<GRID_DIMENSION>,
    chunk_size: usize,
) {
    profiling::scope!("inversion::correlate");
    debug_assert_eq!(forward.len(), adjoint.len());
    let nt = forward.len().saturating_sub(1);
    let inv_dt2 = 1.0 / (dt * dt);
    gradient.par_modify_access(chunk_size).for_each(
        |mut d: DomainChunk<'_, GRID_DIMENSION>| {
            d.indexed_iter_mut().for_each(|(i, _, value_mut)| {
                let mut sum = 0.0;
                for s in 1..nt {
                    let u_tt = (forward[s + 1].buffer()[i]
                        - 2.0 * forward[s].buffer()[i]
                        + forward[s - 1].buffer()[i])
                        * inv_dt2;
                    sum += u_tt * adjoint[nt + 1 - s].buffer()[i];
                }
                *value_mut -= sum;
            })
        },
    );
}

fn history<const GRID_DIMENSION: usize>(
    field: &TimeField<GRID_DIMENSION>,
) -> Result<&[OwnedDomain<GRID_DIMENSION>]> {
    field.history().ok_or_else(|| {
        Error::Configuration(
            "gradients need fields that keep their history".to_string(),
        )
    })
}

/// Misfit and gradient of one shot,
/// on caller owned fields that must be at rest and keep their history.
pub fn shot_gradient_into<const GRID_DIMENSION: usize>(
    solver: &AcousticSolver<GRID_DIMENSION>,
    shot: &Shot<GRID_DIMENSION>,
    forward: &mut TimeField<GRID_DIMENSION>,
    adjoint: &mut TimeField<GRID_DIMENSION>,
    result: &mut GradientResult<GRID_DIMENSION>,
) -> Result<()> {
    profiling::scope!("inversion::shot_gradient");
    let chunk_size = solver.operator().params().chunk_size;
    let synthetic = solver.forward_into(forward, shot.source_position)?;
    let residual = synthetic.residual(&shot.observed)?;
    result.misfit += residual.half_norm_squared();
    solver.adjoint_into(adjoint, &residual)?;
    correlate(
        history(forward)?,
        history(adjoint)?,
        solver.dt(),
        &mut result.gradient,
        chunk_size,
    );
    Ok(())
}

/// Misfit and gradient of one shot with fresh fields.
pub fn shot_gradient<const GRID_DIMENSION: usize>(
    solver: &AcousticSolver<GRID_DIMENSION>,
    shot: &Shot<GRID_DIMENSION>,
) -> Result<GradientResult<GRID_DIMENSION>> {
    let mut forward = solver.new_field(true)?;
    let mut adjoint = solver.new_field(true)?;
    let mut result = GradientResult::zero(solver.model().grid().aabb());
    shot_gradient_into(solver, shot, &mut forward, &mut adjoint, &mut result)?;
    Ok(result)
}

/// Sum over shots, each shot runs in parallel on its own fields.
pub fn gradient<const GRID_DIMENSION: usize>(
    solver: &AcousticSolver<GRID_DIMENSION>,
    shots: &[Shot<GRID_DIMENSION>],
) -> Result<GradientResult<GRID_DIMENSION>> {
    profiling::scope!("inversion::gradient");
    let aabb = solver.model().grid().aabb();
    let chunk_size = solver.operator().params().chunk_size;
    log::info!("computing gradient over {} shots", shots.len());
    shots
        .par_iter()
        .map(|shot| shot_gradient(solver, shot))
        .try_reduce(
            || GradientResult::zero(aabb),
            |a, b| Ok(a.combine(b, chunk_size)),
        )
}

/// Sum over shots one after another,
/// reusing one forward and one adjoint field with a reset per shot.
pub fn sequential_gradient<const GRID_DIMENSION: usize>(
    solver: &AcousticSolver<GRID_DIMENSION>,
    shots: &[Shot<GRID_DIMENSION>],
) -> Result<GradientResult<GRID_DIMENSION>> {
    let chunk_size = solver.operator().params().chunk_size;
    let mut forward = solver.new_field(true)?;
    let mut adjoint = solver.new_field(true)?;
    let mut result = GradientResult::zero(solver.model().grid().aabb());
    for (i, shot) in shots.iter().enumerate() {
        log::debug!("shot {}/{}", i + 1, shots.len());
        forward.reset(chunk_size);
        adjoint.reset(chunk_size);
        shot_gradient_into(
            solver,
            shot,
            &mut forward,
            &mut adjoint,
            &mut result,
        )?;
    }
    Ok(result)
}
