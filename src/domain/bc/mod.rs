mod constant;
mod periodic;

pub use constant::*;
pub use periodic::*;

use crate::domain::DomainView;
use crate::util::*;

/// Lookup for neighbors that fall outside the computational box.
/// Returns None when the coordinate is inside
/// and should be read from `domain` directly.
pub trait BCCheck<const GRID_DIMENSION: usize>: Sync {
    fn check<DomainType: DomainView<GRID_DIMENSION>>(
        &self,
        world_coord: &Coord<GRID_DIMENSION>,
        domain: &DomainType,
    ) -> Option<f64>;
}
