use crate::error::*;
use crate::field::TimeField;
use crate::model::VelocityModel;
use crate::operator::*;
use crate::pde::Parameter;
use crate::sparse::*;
use crate::util::*;

/// Acquisition setup shared by every shot.
#[derive(Clone, Debug)]
pub struct Geometry<const GRID_DIMENSION: usize> {
    pub receiver_positions: Vec<Position<GRID_DIMENSION>>,
    /// Ricker peak frequency.
    pub f0: f64,
    pub amplitude: f64,
    /// One step per sample, `dt` is the axis step.
    pub time_axis: TimeAxis,
}

/// Forward and adjoint acoustic modelling on a velocity model.
pub struct AcousticSolver<const GRID_DIMENSION: usize> {
    model: VelocityModel<GRID_DIMENSION>,
    geometry: Geometry<GRID_DIMENSION>,
    operator: Operator<GRID_DIMENSION>,
    scale: Parameter<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> AcousticSolver<GRID_DIMENSION> {
    pub fn new(
        model: VelocityModel<GRID_DIMENSION>,
        geometry: Geometry<GRID_DIMENSION>,
        params: OperatorParameters,
    ) -> Result<Self> {
        if !(geometry.f0.is_finite() && geometry.f0 > 0.0) {
            return Err(Error::Configuration(format!(
                "peak frequency must be positive, got {}",
                geometry.f0
            )));
        }
        let dt = geometry.time_axis.step;
        let pde = model.pde(params.chunk_size)?;
        let operator = Operator::new(
            model.grid(),
            pde,
            dt,
            Boundary::Dirichlet(0.0),
            params,
        )?;
        let scale = model.injection_scale(dt, params.chunk_size);

        // Fail early on receivers outside the grid
        Receivers::new(model.grid(), geometry.receiver_positions.clone())?;

        Ok(AcousticSolver {
            model,
            geometry,
            operator,
            scale,
        })
    }

    pub fn model(&self) -> &VelocityModel<GRID_DIMENSION> {
        &self.model
    }

    pub fn geometry(&self) -> &Geometry<GRID_DIMENSION> {
        &self.geometry
    }

    pub fn operator(&self) -> &Operator<GRID_DIMENSION> {
        &self.operator
    }

    pub fn dt(&self) -> f64 {
        self.geometry.time_axis.step
    }

    pub fn nt(&self) -> usize {
        self.geometry.time_axis.num
    }

    /// Zero field sized for this solver.
    pub fn new_field(&self, save: bool) -> Result<TimeField<GRID_DIMENSION>> {
        TimeField::new(self.model.grid(), 2, save)
    }

    fn receivers(&self) -> Result<Receivers<GRID_DIMENSION>> {
        Receivers::new(
            self.model.grid(),
            self.geometry.receiver_positions.clone(),
        )
    }

    /// Shot from a Ricker source at `source_position`,
    /// returns the receiver traces and the final field.
    pub fn forward(
        &self,
        source_position: Position<GRID_DIMENSION>,
        save: bool,
    ) -> Result<(Traces, TimeField<GRID_DIMENSION>)> {
        let mut field = self.new_field(save)?;
        let traces = self.forward_into(&mut field, source_position)?;
        Ok((traces, field))
    }

    /// Like `forward` but runs on a caller owned field,
    /// which must be at rest.
    pub fn forward_into(
        &self,
        field: &mut TimeField<GRID_DIMENSION>,
        source_position: Position<GRID_DIMENSION>,
    ) -> Result<Traces> {
        let source = Source::from_wavelet(
            self.model.grid(),
            vec![source_position],
            &RickerWavelet::new(self.geometry.f0),
            self.geometry.amplitude,
            &self.geometry.time_axis,
            self.scale.clone(),
        )?;
        let mut receivers = self.receivers()?;
        self.operator
            .apply(field, Some(&source), Some(&mut receivers), self.nt())?;
        Ok(receivers.into_traces())
    }

    /// Adjoint wavefield of `residual`, the residual is injected
    /// backwards in time at the receiver positions.
    /// `field` must be at rest and should keep its history.
    pub fn adjoint_into(
        &self,
        field: &mut TimeField<GRID_DIMENSION>,
        residual: &Traces,
    ) -> Result<()> {
        let points = self.receivers()?.points().clone();
        let source =
            Source::new(points, residual.time_reversed(), self.scale.clone())?;
        self.operator.apply(field, Some(&source), None, self.nt())?;
        Ok(())
    }
}
