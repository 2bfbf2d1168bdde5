//! Everything that lives between grid points:
//! sources, receivers and their time series.

mod points;
mod receiver;
mod source;
mod time_axis;
mod traces;
mod wavelet;

pub use points::*;
pub use receiver::*;
pub use source::*;
pub use time_axis::*;
pub use traces::*;
pub use wavelet::*;
