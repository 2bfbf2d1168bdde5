//! This module has things for managing the domain,
//! which really means retrieving values based on world coordinates.
//! World coordinates index the computational box of a grid,
//! damping margin included.
//! Views translate from world coordinates into buffer positions.

mod bc;
mod gather_args;
mod view;

pub use bc::*;
pub use gather_args::*;
pub use view::*;
