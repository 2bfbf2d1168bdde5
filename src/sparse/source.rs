use crate::domain::*;
use crate::error::*;
use crate::grid::Grid;
use crate::pde::Parameter;
use crate::sparse::*;
use crate::util::*;

/// Off grid points with one amplitude series each,
/// injected with a per point scale such as `dt^2 / m`.
#[derive(Clone, Debug)]
pub struct Source<const GRID_DIMENSION: usize> {
    points: SparsePoints<GRID_DIMENSION>,
    data: Traces,
    scale: Parameter<GRID_DIMENSION>,
}

impl<const GRID_DIMENSION: usize> Source<GRID_DIMENSION> {
    pub fn new(
        points: SparsePoints<GRID_DIMENSION>,
        data: Traces,
        scale: Parameter<GRID_DIMENSION>,
    ) -> Result<Self> {
        if data.npoint() != points.len() {
            return Err(Error::Configuration(format!(
                "{} source points but {} amplitude series",
                points.len(),
                data.npoint()
            )));
        }
        if let Parameter::Field(field) = &scale {
            if field.aabb() != points.aabb() {
                return Err(Error::Configuration(format!(
                    "scale field covers {}, source points index {}",
                    field.aabb(),
                    points.aabb()
                )));
            }
        }
        Ok(Source {
            points,
            data,
            scale,
        })
    }

    /// Every point fires the same wavelet sampled on `axis`.
    pub fn from_wavelet<W: Wavelet>(
        grid: &Grid<GRID_DIMENSION>,
        positions: Vec<Position<GRID_DIMENSION>>,
        wavelet: &W,
        amplitude: f64,
        axis: &TimeAxis,
        scale: Parameter<GRID_DIMENSION>,
    ) -> Result<Self> {
        let points = SparsePoints::new(grid, positions)?;
        let signal: Vec<f64> = wavelet
            .sample(axis)
            .into_iter()
            .map(|v| amplitude * v)
            .collect();
        let data = Traces::broadcast(&signal, points.len());
        Self::new(points, data, scale)
    }

    pub fn points(&self) -> &SparsePoints<GRID_DIMENSION> {
        &self.points
    }

    pub fn data(&self) -> &Traces {
        &self.data
    }

    pub fn scale(&self) -> &Parameter<GRID_DIMENSION> {
        &self.scale
    }

    /// Add the amplitudes of step `t`, steps past the end inject nothing.
    pub fn inject<DomainType: DomainView<GRID_DIMENSION>>(
        &self,
        t: usize,
        domain: &mut DomainType,
    ) {
        if t >= self.data.nt() {
            return;
        }
        self.points.inject(domain, self.data.row(t), &self.scale);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn injects_by_step() {
        let grid = Grid::<1>::from_spacing(&[5], &[1.0], &[0.0]).unwrap();
        let points = SparsePoints::new(&grid, vec![vector![1.5]]).unwrap();
        let data = Traces::from_data(2, 1, vec![2.0, -4.0]).unwrap();
        let source =
            Source::new(points, data, Parameter::Constant(0.5)).unwrap();
        let mut domain = OwnedDomain::new(grid.aabb());

        source.inject(0, &mut domain);
        assert_eq!(domain.buffer(), &[0.0, 0.5, 0.5, 0.0, 0.0]);
        source.inject(1, &mut domain);
        assert_eq!(domain.buffer(), &[0.0, -0.5, -0.5, 0.0, 0.0]);
        source.inject(2, &mut domain);
        assert_eq!(domain.buffer(), &[0.0, -0.5, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn wavelet_source() {
        let grid = Grid::<2>::from_spacing(&[5, 5], &[1.0, 1.0], &[0.0, 0.0])
            .unwrap();
        let axis = TimeAxis::new(0.0, 1.0, 10).unwrap();
        let wavelet = RickerWavelet::with_delay(0.1, 3.0);
        let source = Source::from_wavelet(
            &grid,
            vec![vector![1.0, 1.0], vector![2.5, 3.0]],
            &wavelet,
            2.0,
            &axis,
            Parameter::Constant(1.0),
        )
        .unwrap();
        assert_eq!(source.data().nt(), 10);
        assert_eq!(source.data().npoint(), 2);
        assert_approx_eq!(f64, source.data().get(3, 1), 2.0);

        let points = SparsePoints::new(&grid, vec![vector![1.0, 1.0]]).unwrap();
        let data = Traces::new(3, 2);
        assert!(Source::new(points, data, Parameter::Constant(1.0)).is_err());
    }
}
