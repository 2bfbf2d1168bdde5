//! Stencils are built once at setup from finite difference
//! coefficient tables, the time loop only applies them.

mod fd_weights;
mod linear_stencil;

pub use fd_weights::*;
pub use linear_stencil::*;
