//! Scenario files.
//!
//! A scenario is a TOML document describing one forward run:
//!
//! ```toml
//! boundary = "periodic"
//!
//! [grid]
//! shape = [201]
//! extent = [1.0]
//!
//! [time]
//! nt = 150
//!
//! [stencil]
//! space_order = 1
//!
//! [equation]
//! kind = "convection"
//! velocity = [1.0]
//!
//! [initial]
//! kind = "gaussian"
//! center = [0.3]
//! sigma = 0.03
//!
//! [output]
//! snapshot = "final.csv"
//! ```
//!
//! Grids have 1 to 3 axes, the dimension is the length of `grid.shape`.

use crate::csv;
use crate::domain::*;
use crate::error::*;
use crate::field::TimeField;
use crate::grid::Grid;
use crate::image::{self, ColorMap};
use crate::init;
use crate::model::VelocityModel;
use crate::operator::*;
use crate::pde::*;
use crate::sparse::*;
use crate::stability::{self, StabilityPolicy};
use crate::util::*;
use crate::vtk;
use serde::Deserialize;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    #[default]
    Dirichlet,
    Periodic,
    Ghost,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub shape: Vec<usize>,
    pub spacing: Option<Vec<f64>>,
    pub extent: Option<Vec<f64>>,
    pub origin: Option<Vec<f64>>,
    #[serde(default)]
    pub nbl: usize,
}

fn default_cfl_safety() -> f64 {
    0.9
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeConfig {
    pub nt: usize,
    /// Defaults to `cfl_safety` times the critical time step.
    pub dt: Option<f64>,
    #[serde(default = "default_cfl_safety")]
    pub cfl_safety: f64,
    /// Must match the equation when given.
    pub time_order: Option<usize>,
    /// Overrides the caller's policy when given.
    pub stability: Option<StabilityPolicy>,
}

fn default_space_order() -> usize {
    2
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StencilConfig {
    #[serde(default = "default_space_order")]
    pub space_order: usize,
}

impl Default for StencilConfig {
    fn default() -> Self {
        StencilConfig {
            space_order: default_space_order(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EquationConfig {
    /// `u_t + c . grad(u) = 0`, one velocity per axis.
    Convection { velocity: Vec<f64> },
    /// `u_t = alpha laplacian(u)`
    Diffusion { alpha: f64 },
    /// Constant velocity acoustic wave equation, damped in the margin.
    Acoustic { velocity: f64 },
}

impl EquationConfig {
    pub fn time_order(&self) -> usize {
        match self {
            EquationConfig::Acoustic { .. } => 2,
            _ => 1,
        }
    }
}

fn default_amplitude() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InitialConfig {
    Gaussian {
        center: Vec<f64>,
        sigma: f64,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    Box {
        min: Vec<f64>,
        max: Vec<f64>,
        #[serde(default = "default_amplitude")]
        value: f64,
        #[serde(default)]
        background: f64,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveletKind {
    #[default]
    Ricker,
    Gabor,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub position: Vec<f64>,
    pub f0: f64,
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub wavelet: WaveletKind,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiverConfig {
    pub positions: Vec<Vec<f64>>,
}

/// Paths are relative to the output directory.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Final field, CSV in 1D, PNG or CSV in 2D, VTU in 3D.
    pub snapshot: Option<PathBuf>,
    /// Receiver gather as PNG.
    pub gather: Option<PathBuf>,
    /// Receiver traces as CSV.
    pub traces: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub boundary: BoundaryKind,
    #[serde(default)]
    pub boundary_value: f64,
    pub grid: GridConfig,
    pub time: TimeConfig,
    #[serde(default)]
    pub stencil: StencilConfig,
    pub equation: EquationConfig,
    pub initial: Option<InitialConfig>,
    pub source: Option<SourceConfig>,
    pub receivers: Option<ReceiverConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What a scenario run produced.
#[derive(Clone, Debug)]
pub struct ScenarioReport {
    pub dimension: usize,
    pub dt: f64,
    pub critical_dt: f64,
    pub summary: RunSummary,
    pub traces: Option<Traces>,
}

/// Result of the dimension generic part of a run.
struct Outcome<const GRID_DIMENSION: usize> {
    grid: Grid<GRID_DIMENSION>,
    field: TimeField<GRID_DIMENSION>,
    axis: TimeAxis,
    critical_dt: f64,
    summary: RunSummary,
    traces: Option<Traces>,
}

fn check_len(name: &str, values: &[f64], dimension: usize) -> Result<()> {
    if values.len() != dimension {
        return Err(Error::Configuration(format!(
            "{name} has {} entries for a {dimension}D grid",
            values.len()
        )));
    }
    Ok(())
}

fn to_position<const GRID_DIMENSION: usize>(
    name: &str,
    values: &[f64],
) -> Result<Position<GRID_DIMENSION>> {
    check_len(name, values, GRID_DIMENSION)?;
    Ok(Position::from_column_slice(values))
}

fn resolve(output_dir: Option<&Path>, path: &Path) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(s)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        log::info!("reading scenario {:?}", path.as_ref());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn dimension(&self) -> usize {
        self.grid.shape.len()
    }

    /// Checks what can be checked without building the grid.
    pub fn validate(&self) -> Result<()> {
        let dimension = self.dimension();
        if !(1..=3).contains(&dimension) {
            return Err(Error::Configuration(format!(
                "grids have 1 to 3 dimensions, got {dimension}"
            )));
        }
        match (&self.grid.spacing, &self.grid.extent) {
            (Some(spacing), None) => {
                check_len("grid.spacing", spacing, dimension)?
            }
            (None, Some(extent)) => {
                check_len("grid.extent", extent, dimension)?
            }
            _ => {
                return Err(Error::Configuration(
                    "grid needs exactly one of spacing and extent".to_string(),
                ))
            }
        }
        if let Some(origin) = &self.grid.origin {
            check_len("grid.origin", origin, dimension)?;
        }

        if let Some(dt) = self.time.dt {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(Error::Configuration(format!(
                    "time.dt must be positive, got {dt}"
                )));
            }
        }
        let safety = self.time.cfl_safety;
        if !(safety > 0.0 && safety <= 1.0) {
            return Err(Error::Configuration(format!(
                "time.cfl_safety must be in (0, 1], got {safety}"
            )));
        }
        if let Some(order) = self.time.time_order {
            if order != self.equation.time_order() {
                return Err(Error::Configuration(format!(
                    "time.time_order is {order}, the equation is of order {}",
                    self.equation.time_order()
                )));
            }
        }
        if self.stencil.space_order == 0 {
            return Err(Error::Configuration(
                "stencil.space_order must be positive".to_string(),
            ));
        }

        match &self.equation {
            EquationConfig::Convection { velocity } => {
                check_len("equation.velocity", velocity, dimension)?
            }
            EquationConfig::Diffusion { .. } => {}
            EquationConfig::Acoustic { velocity } => {
                if !(velocity.is_finite() && *velocity > 0.0) {
                    return Err(Error::Configuration(format!(
                        "equation.velocity must be positive, got {velocity}"
                    )));
                }
            }
        }

        match &self.initial {
            Some(InitialConfig::Gaussian { center, sigma, .. }) => {
                check_len("initial.center", center, dimension)?;
                if !(sigma.is_finite() && *sigma > 0.0) {
                    return Err(Error::Configuration(format!(
                        "initial.sigma must be positive, got {sigma}"
                    )));
                }
            }
            Some(InitialConfig::Box { min, max, .. }) => {
                check_len("initial.min", min, dimension)?;
                check_len("initial.max", max, dimension)?;
            }
            None => {}
        }

        if let Some(source) = &self.source {
            check_len("source.position", &source.position, dimension)?;
            if !(source.f0.is_finite() && source.f0 > 0.0) {
                return Err(Error::Configuration(format!(
                    "source.f0 must be positive, got {}",
                    source.f0
                )));
            }
        }
        if let Some(receivers) = &self.receivers {
            for p in receivers.positions.iter() {
                check_len("receivers.positions", p, dimension)?;
            }
        }
        if self.receivers.is_none()
            && (self.output.gather.is_some() || self.output.traces.is_some())
        {
            return Err(Error::Configuration(
                "gather and traces output need receivers".to_string(),
            ));
        }
        Ok(())
    }

    pub fn boundary(&self) -> Boundary {
        match self.boundary {
            BoundaryKind::Dirichlet => Boundary::Dirichlet(self.boundary_value),
            BoundaryKind::Periodic => Boundary::Periodic,
            BoundaryKind::Ghost => Boundary::Ghost(self.boundary_value),
        }
    }

    pub fn build_grid<const GRID_DIMENSION: usize>(
        &self,
    ) -> Result<Grid<GRID_DIMENSION>> {
        let origin = self
            .grid
            .origin
            .clone()
            .unwrap_or_else(|| vec![0.0; self.dimension()]);
        let grid = match (&self.grid.spacing, &self.grid.extent) {
            (Some(spacing), _) => {
                Grid::from_spacing(&self.grid.shape, spacing, &origin)?
            }
            (None, Some(extent)) => {
                Grid::from_extent(&self.grid.shape, extent, &origin)?
            }
            (None, None) => {
                return Err(Error::Configuration(
                    "grid needs one of spacing and extent".to_string(),
                ))
            }
        };
        grid.with_damping_layer(self.grid.nbl)
    }

    /// Equation on `grid`, with the velocity model for acoustic runs.
    fn equation<const GRID_DIMENSION: usize>(
        &self,
        grid: &Grid<GRID_DIMENSION>,
        chunk_size: usize,
    ) -> Result<(Pde<GRID_DIMENSION>, Option<VelocityModel<GRID_DIMENSION>>)> {
        let space_order = self.stencil.space_order;
        match &self.equation {
            EquationConfig::Convection { velocity } => {
                let velocity = to_position("equation.velocity", velocity)?;
                let pde =
                    Pde::convection(&velocity, space_order, &grid.spacing())?;
                Ok((pde, None))
            }
            EquationConfig::Diffusion { alpha } => {
                let pde =
                    Pde::diffusion(*alpha, space_order, &grid.spacing())?;
                Ok((pde, None))
            }
            EquationConfig::Acoustic { velocity } => {
                let model = VelocityModel::constant(
                    grid.clone(),
                    *velocity,
                    grid.nbl(),
                    space_order,
                    chunk_size,
                )?;
                Ok((model.pde(chunk_size)?, Some(model)))
            }
        }
    }

    fn simulate<const GRID_DIMENSION: usize>(
        &self,
        params: OperatorParameters,
    ) -> Result<Outcome<GRID_DIMENSION>> {
        profiling::scope!("config::simulate");
        let mut params = params;
        if let Some(policy) = self.time.stability {
            params.stability = policy;
        }
        let chunk_size = params.chunk_size;

        let grid = self.build_grid::<GRID_DIMENSION>()?;
        let (pde, model) = self.equation(&grid, chunk_size)?;

        let critical_dt = stability::critical_dt(&pde);
        let dt = match self.time.dt {
            Some(dt) => dt,
            None if critical_dt.is_finite() && critical_dt > 0.0 => {
                self.time.cfl_safety * critical_dt
            }
            None => {
                return Err(Error::Configuration(format!(
                    "time.dt is required, the critical dt is {critical_dt}"
                )))
            }
        };
        log::info!(
            "{}D scenario, dt = {dt}, critical dt = {critical_dt}, nt = {}",
            GRID_DIMENSION,
            self.time.nt
        );

        let time_order = pde.time_order();
        let operator = Operator::new(&grid, pde, dt, self.boundary(), params)?;
        let axis = TimeAxis::new(0.0, dt, self.time.nt)?;

        let mut field = TimeField::new(&grid, time_order, false)?;
        if let Some(initial) = &self.initial {
            let mut state = OwnedDomain::new(grid.aabb());
            match initial {
                InitialConfig::Gaussian {
                    center,
                    sigma,
                    amplitude,
                } => {
                    let center = to_position("initial.center", center)?;
                    init::gaussian(
                        &mut state,
                        &grid,
                        &center,
                        *sigma,
                        *amplitude,
                        chunk_size,
                    );
                }
                InitialConfig::Box {
                    min,
                    max,
                    value,
                    background,
                } => {
                    let min = to_position("initial.min", min)?;
                    let max = to_position("initial.max", max)?;
                    init::box_pulse(
                        &mut state,
                        &grid,
                        &min,
                        &max,
                        *value,
                        *background,
                        chunk_size,
                    );
                }
            }
            field.set_initial_from(&state, chunk_size)?;
        }

        let source = match &self.source {
            Some(config) => {
                // Second order problems scale by dt^2 / m,
                // first order ones add dt times the forcing.
                let scale = match &model {
                    Some(model) => model.injection_scale(dt, chunk_size),
                    None => Parameter::Constant(dt),
                };
                let position =
                    to_position("source.position", &config.position)?;
                let source = match config.wavelet {
                    WaveletKind::Ricker => Source::from_wavelet(
                        &grid,
                        vec![position],
                        &RickerWavelet::new(config.f0),
                        config.amplitude,
                        &axis,
                        scale,
                    )?,
                    WaveletKind::Gabor => Source::from_wavelet(
                        &grid,
                        vec![position],
                        &GaborWavelet::new(config.f0),
                        config.amplitude,
                        &axis,
                        scale,
                    )?,
                };
                Some(source)
            }
            None => None,
        };

        let mut receivers = match &self.receivers {
            Some(config) => {
                let positions = config
                    .positions
                    .iter()
                    .map(|p| to_position("receivers.positions", p))
                    .collect::<Result<Vec<_>>>()?;
                Some(Receivers::new(&grid, positions)?)
            }
            None => None,
        };

        let summary = operator.apply(
            &mut field,
            source.as_ref(),
            receivers.as_mut(),
            self.time.nt,
        )?;
        log::info!(
            "finished {} steps, t = {}, max |u| = {}",
            summary.steps,
            summary.simulated_time,
            summary.max_abs
        );

        Ok(Outcome {
            grid,
            field,
            axis,
            critical_dt,
            summary,
            traces: receivers.map(|r| r.into_traces()),
        })
    }

    fn finish<const GRID_DIMENSION: usize, F>(
        &self,
        outcome: Outcome<GRID_DIMENSION>,
        output_dir: Option<&Path>,
        write_snapshot: F,
    ) -> Result<ScenarioReport>
    where
        F: FnOnce(
            &OwnedDomain<GRID_DIMENSION>,
            &Grid<GRID_DIMENSION>,
            &Path,
        ) -> Result<()>,
    {
        if let Some(path) = &self.output.snapshot {
            write_snapshot(
                outcome.field.current(),
                &outcome.grid,
                &resolve(output_dir, path),
            )?;
        }
        if let Some(traces) = &outcome.traces {
            if let Some(path) = &self.output.traces {
                let path = resolve(output_dir, path);
                csv::write_traces_csv(traces, &outcome.axis, &path)?;
            }
            if let Some(path) = &self.output.gather {
                image::gather_image(traces, &resolve(output_dir, path))?;
            }
        }
        Ok(ScenarioReport {
            dimension: GRID_DIMENSION,
            dt: outcome.axis.step,
            critical_dt: outcome.critical_dt,
            summary: outcome.summary,
            traces: outcome.traces,
        })
    }

    /// Run the scenario and write the requested outputs.
    pub fn run(
        &self,
        output_dir: Option<&Path>,
        params: OperatorParameters,
    ) -> Result<ScenarioReport> {
        self.validate()?;
        match self.dimension() {
            1 => {
                let outcome = self.simulate::<1>(params)?;
                self.finish(outcome, output_dir, write_snapshot_1d)
            }
            2 => {
                let outcome = self.simulate::<2>(params)?;
                self.finish(outcome, output_dir, write_snapshot_2d)
            }
            3 => {
                let outcome = self.simulate::<3>(params)?;
                self.finish(outcome, output_dir, write_snapshot_3d)
            }
            d => Err(Error::Configuration(format!(
                "grids have 1 to 3 dimensions, got {d}"
            ))),
        }
    }
}

/// `x, value` lines.
fn write_snapshot_1d(
    domain: &OwnedDomain<1>,
    grid: &Grid<1>,
    path: &Path,
) -> Result<()> {
    log::info!("writing {:?}", path);
    let mut output = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(output, "x, value")?;
    for (coord, value) in domain.aabb().coord_iter().zip(domain.buffer()) {
        writeln!(output, "{}, {value}", grid.position(&coord)[0])?;
    }
    output.flush()?;
    Ok(())
}

fn write_snapshot_2d(
    domain: &OwnedDomain<2>,
    _grid: &Grid<2>,
    path: &Path,
) -> Result<()> {
    match extension(path).as_str() {
        "png" => image::image2d(domain, ColorMap::RedBlue, &path),
        "csv" => csv::write_csv_2d(domain, &path),
        other => Err(Error::Configuration(format!(
            "2D snapshots are png or csv, got {other:?}"
        ))),
    }
}

fn write_snapshot_3d(
    domain: &OwnedDomain<3>,
    grid: &Grid<3>,
    path: &Path,
) -> Result<()> {
    match extension(path).as_str() {
        "vtu" => vtk::write_vtk3d(domain, grid, &path),
        other => Err(Error::Configuration(format!(
            "3D snapshots are vtu, got {other:?}"
        ))),
    }
}
