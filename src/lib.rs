//! Explicit finite-difference time marching on regular grids.
//!
//! A `Pde` is discretized into an `UpdateRule` with Fornberg weights,
//! an `Operator` marches a `TimeField` forward, sparse `Source`s inject
//! before each update and `Receivers` sample after it.
//! The acoustic model and the inversion module build the forward,
//! adjoint and gradient runs of full waveform inversion on top of that.

pub mod acoustic;
pub mod build_info;
pub mod cli;
pub mod config;
pub mod csv;
pub mod damping;
pub mod domain;
pub mod error;
pub mod field;
pub mod grid;
pub mod image;
pub mod init;
pub mod inversion;
pub mod logging;
pub mod model;
pub mod operator;
pub mod par_slice;
pub mod pde;
pub mod sparse;
pub mod stability;
pub mod stencil;
pub mod util;
pub mod vtk;

pub use error::{Error, Result};
