use thiserror::Error;

/// Everything that can stop a simulation run.
/// None of these are recoverable, a run is rejected or aborted.
#[derive(Error, Debug)]
pub enum Error {
    /// Inconsistent shapes, non-positive sizes, unsupported orders.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Time step above the critical time step of the update rule.
    #[error("unstable time step: dt = {dt} exceeds critical dt = {critical_dt}")]
    UnstableTimestep { dt: f64, critical_dt: f64 },

    /// The field blew up during the run.
    #[error("non-finite field values detected after step {step}")]
    NonFinite { step: usize },

    /// A source or receiver lies outside the computational box.
    #[error("coordinate {position:?} outside of grid [{min:?}, {max:?}]")]
    CoordinateOutOfRange {
        position: Vec<f64>,
        min: Vec<f64>,
        max: Vec<f64>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("vtk error: {0}")]
    Vtk(String),
}

impl Error {
    /// Both flavors of numerical instability.
    pub fn is_instability(&self) -> bool {
        matches!(
            self,
            Error::UnstableTimestep { .. } | Error::NonFinite { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
