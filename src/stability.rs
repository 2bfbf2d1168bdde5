//! Critical time step of the explicit update rule.
//!
//! The bound comes from von Neumann analysis of the constant
//! coefficient problem, with the smallest mass over the grid.
//! The symbol `S(theta)` of the spatial stencil is sampled on a
//! grid of wavenumbers, axis 0 over `[0, pi]` and the rest over
//! `[-pi, pi]` since `S(-theta)` is the conjugate of `S(theta)`.
//!
//! * second order in time: leapfrog is stable while
//!   `dt <= 2 sqrt(m / max |S|)`,
//! * first order in time: forward Euler amplification
//!   `1 + dt S / m` stays in the unit disk while
//!   `dt <= -2 m Re(S) / |S|^2`.

use crate::error::*;
use crate::pde::Pde;
use crate::util::*;
use serde::Deserialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityPolicy {
    /// Refuse to run above the critical time step.
    #[default]
    Reject,
    /// Log a warning and run anyway.
    Warn,
}

fn samples_per_axis(dimension: usize) -> usize {
    match dimension {
        1 => 257,
        2 => 65,
        _ => 17,
    }
}

/// Sampled symbol values `(re, im)` of the spatial stencil.
fn sample_symbol<const GRID_DIMENSION: usize>(
    pde: &Pde<GRID_DIMENSION>,
) -> Vec<(f64, f64)> {
    let n = samples_per_axis(GRID_DIMENSION) as i32;
    let counts = Coord::<GRID_DIMENSION>::repeat(n);
    let sample_box = AABB::from_exclusive(counts);
    let pi = std::f64::consts::PI;
    sample_box
        .coord_iter()
        .map(|c| {
            let mut theta = Position::<GRID_DIMENSION>::zero();
            for d in 0..GRID_DIMENSION {
                let f = c[d] as f64 / (n - 1) as f64;
                theta[d] = if d == 0 { pi * f } else { pi * (2.0 * f - 1.0) };
            }
            pde.spatial().symbol(&theta)
        })
        .collect()
}

/// Largest stable time step for `pde`.
/// Zero means no positive time step is stable,
/// infinity means there is no spatial coupling to limit it.
pub fn critical_dt<const GRID_DIMENSION: usize>(
    pde: &Pde<GRID_DIMENSION>,
) -> f64 {
    profiling::scope!("stability::critical_dt");
    let mass = pde.mass().min();
    let samples = sample_symbol(pde);
    let max_abs = samples
        .iter()
        .map(|(re, im)| re.hypot(*im))
        .fold(0.0, f64::max);
    if max_abs == 0.0 {
        return f64::INFINITY;
    }

    if pde.time_order() == 2 {
        return 2.0 * (mass / max_abs).sqrt();
    }

    let tolerance = 1e-12 * max_abs;
    let mut bound = f64::INFINITY;
    for (re, im) in samples {
        let abs = re.hypot(im);
        if abs <= tolerance {
            continue;
        }
        if re > tolerance {
            return 0.0;
        }
        bound = bound.min((-2.0 * mass * re / (abs * abs)).max(0.0));
    }
    bound
}

/// Compare `dt` against the critical time step under `policy`.
pub fn check_timestep(
    dt: f64,
    critical_dt: f64,
    policy: StabilityPolicy,
) -> Result<()> {
    // Allow round off when dt was computed from the bound itself
    if dt <= critical_dt * (1.0 + 1e-12) {
        return Ok(());
    }
    match policy {
        StabilityPolicy::Reject => {
            Err(Error::UnstableTimestep { dt, critical_dt })
        }
        StabilityPolicy::Warn => {
            log::warn!(
                "time step {dt} exceeds the critical time step {critical_dt}, \
                 expect the solution to blow up"
            );
            Ok(())
        }
    }
}
