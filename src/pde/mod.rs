//! Linear PDEs of the form
//! `mass * d^k u / dt^k + damping * du/dt = L u`
//! with `k` the time order and `L` a linear spatial stencil.
//!
//! A PDE is discretized into taps, each tap is one term
//! of the discrete equation `sum(taps) = 0`.
//! The explicit update rule is the equation solved
//! for the next time level at the center point.

mod parameter;
mod update_rule;

pub use parameter::*;
pub use update_rule::*;

use crate::error::*;
use crate::stencil::*;
use crate::util::*;

/// Time level of a tap, relative to the current level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeLevel {
    Previous,
    Current,
    Next,
}

impl TimeLevel {
    pub fn shift(&self) -> i32 {
        match self {
            TimeLevel::Previous => -1,
            TimeLevel::Current => 0,
            TimeLevel::Next => 1,
        }
    }
}

/// Which equation coefficient multiplies a tap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Coefficient {
    Unit,
    Mass,
    Damping,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tap<const GRID_DIMENSION: usize> {
    pub level: TimeLevel,
    pub offset: Coord<GRID_DIMENSION>,
    pub weight: f64,
    pub coefficient: Coefficient,
}

impl<const GRID_DIMENSION: usize> Tap<GRID_DIMENSION> {
    fn center(level: TimeLevel, weight: f64, coefficient: Coefficient) -> Self {
        Tap {
            level,
            offset: Coord::zero(),
            weight,
            coefficient,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pde<const GRID_DIMENSION: usize> {
    time_order: usize,
    spatial: LinearStencil<GRID_DIMENSION>,
    mass: Parameter<GRID_DIMENSION>,
    damping: Option<Parameter<GRID_DIMENSION>>,
}

impl<const GRID_DIMENSION: usize> Pde<GRID_DIMENSION> {
    pub fn new(
        time_order: usize,
        spatial: LinearStencil<GRID_DIMENSION>,
        mass: Parameter<GRID_DIMENSION>,
        damping: Option<Parameter<GRID_DIMENSION>>,
    ) -> Result<Self> {
        if time_order == 0 || time_order > 2 {
            return Err(Error::Configuration(format!(
                "time order must be 1 or 2, got {time_order}"
            )));
        }
        Ok(Pde {
            time_order,
            spatial,
            mass,
            damping,
        })
    }

    /// `u_t + sum_d c_d du/dx_d = 0` with upwind differences,
    /// backward where `c_d >= 0` and forward otherwise.
    pub fn convection(
        velocity: &Position<GRID_DIMENSION>,
        space_order: usize,
        spacing: &Position<GRID_DIMENSION>,
    ) -> Result<Self> {
        let mut spatial = LinearStencil::zero();
        for d in 0..GRID_DIMENSION {
            let c = velocity[d];
            if !c.is_finite() {
                return Err(Error::Configuration(format!(
                    "velocity must be finite, got {c}"
                )));
            }
            if c == 0.0 {
                continue;
            }
            let side = if c > 0.0 { Side::Left } else { Side::Right };
            let dx = LinearStencil::axis_derivative(
                d,
                1,
                side,
                space_order,
                spacing[d],
            )?;
            spatial = spatial.add(&dx.scale(-c));
        }
        Self::new(1, spatial, Parameter::Constant(1.0), None)
    }

    /// `u_t = alpha * laplacian(u)`.
    pub fn diffusion(
        alpha: f64,
        space_order: usize,
        spacing: &Position<GRID_DIMENSION>,
    ) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(Error::Configuration(format!(
                "diffusivity must be positive, got {alpha}"
            )));
        }
        let spatial =
            LinearStencil::laplacian(space_order, spacing)?.scale(alpha);
        Self::new(1, spatial, Parameter::Constant(1.0), None)
    }

    /// `m u_tt + eta u_t = laplacian(u)`.
    pub fn wave(
        mass: Parameter<GRID_DIMENSION>,
        damping: Option<Parameter<GRID_DIMENSION>>,
        space_order: usize,
        spacing: &Position<GRID_DIMENSION>,
    ) -> Result<Self> {
        let spatial = LinearStencil::laplacian(space_order, spacing)?;
        Self::new(2, spatial, mass, damping)
    }

    pub fn time_order(&self) -> usize {
        self.time_order
    }

    pub fn spatial(&self) -> &LinearStencil<GRID_DIMENSION> {
        &self.spatial
    }

    pub fn mass(&self) -> &Parameter<GRID_DIMENSION> {
        &self.mass
    }

    pub fn damping(&self) -> Option<&Parameter<GRID_DIMENSION>> {
        self.damping.as_ref()
    }

    /// Coefficient value at a linear index of the computational box.
    #[inline]
    pub fn coefficient(
        &self,
        coefficient: Coefficient,
        linear_index: usize,
    ) -> f64 {
        match coefficient {
            Coefficient::Unit => 1.0,
            Coefficient::Mass => self.mass.value(linear_index),
            Coefficient::Damping => self
                .damping
                .as_ref()
                .map_or(0.0, |p| p.value(linear_index)),
        }
    }

    /// Discrete equation as taps summing to zero.
    ///
    /// Time derivatives are forward for first order and centered for
    /// second order. Damping follows the same pattern, forward in first
    /// order problems and `(u+ - u-) / 2dt` in second order ones.
    pub fn discretize(&self, dt: f64) -> Result<Vec<Tap<GRID_DIMENSION>>> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(Error::Configuration(format!(
                "time step must be positive, got {dt}"
            )));
        }
        let mut taps = Vec::new();
        let mut center = |level, weight, coefficient| {
            taps.push(Tap::center(level, weight, coefficient))
        };
        match self.time_order {
            1 => {
                center(TimeLevel::Next, 1.0 / dt, Coefficient::Mass);
                center(TimeLevel::Current, -1.0 / dt, Coefficient::Mass);
                if self.damping.is_some() {
                    center(TimeLevel::Next, 1.0 / dt, Coefficient::Damping);
                    center(TimeLevel::Current, -1.0 / dt, Coefficient::Damping);
                }
            }
            _ => {
                let dt2 = dt * dt;
                center(TimeLevel::Next, 1.0 / dt2, Coefficient::Mass);
                center(TimeLevel::Current, -2.0 / dt2, Coefficient::Mass);
                center(TimeLevel::Previous, 1.0 / dt2, Coefficient::Mass);
                if self.damping.is_some() {
                    let w = 1.0 / (2.0 * dt);
                    center(TimeLevel::Next, w, Coefficient::Damping);
                    center(TimeLevel::Previous, -w, Coefficient::Damping);
                }
            }
        }
        for (offset, weight) in self.spatial.offset_weights() {
            taps.push(Tap {
                level: TimeLevel::Current,
                offset: *offset,
                weight: -weight,
                coefficient: Coefficient::Unit,
            });
        }
        Ok(taps)
    }
}
