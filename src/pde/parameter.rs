use crate::domain::*;
use crate::error::*;
use crate::util::*;

/// Equation coefficient, either uniform or one value per grid point.
#[derive(Clone, Debug)]
pub enum Parameter<const GRID_DIMENSION: usize> {
    Constant(f64),
    Field(OwnedDomain<GRID_DIMENSION>),
}

impl<const GRID_DIMENSION: usize> Parameter<GRID_DIMENSION> {
    #[inline]
    pub fn value(&self, linear_index: usize) -> f64 {
        match self {
            Parameter::Constant(v) => *v,
            Parameter::Field(domain) => domain.buffer()[linear_index],
        }
    }

    pub fn min(&self) -> f64 {
        match self {
            Parameter::Constant(v) => *v,
            Parameter::Field(domain) => {
                domain.buffer().iter().copied().fold(f64::INFINITY, f64::min)
            }
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            Parameter::Constant(v) => *v,
            Parameter::Field(domain) => domain
                .buffer()
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Fields must cover exactly `aabb`.
    pub fn check(
        &self,
        name: &str,
        aabb: &AABB<GRID_DIMENSION>,
        positive: bool,
    ) -> Result<()> {
        if let Parameter::Field(domain) = self {
            if domain.aabb() != aabb {
                return Err(Error::Configuration(format!(
                    "{name} field covers {}, the grid covers {aabb}",
                    domain.aabb()
                )));
            }
        }
        let finite = match self {
            Parameter::Constant(v) => v.is_finite(),
            Parameter::Field(domain) => {
                domain.buffer().iter().all(|v| v.is_finite())
            }
        };
        let lo = self.min();
        if !finite {
            return Err(Error::Configuration(format!(
                "{name} must be finite"
            )));
        }
        if positive && lo <= 0.0 {
            return Err(Error::Configuration(format!(
                "{name} must be positive, minimum is {lo}"
            )));
        }
        if !positive && lo < 0.0 {
            return Err(Error::Configuration(format!(
                "{name} must not be negative, minimum is {lo}"
            )));
        }
        Ok(())
    }
}
