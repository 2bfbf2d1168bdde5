use crate::domain::*;
use crate::error::*;
use crate::grid::Grid;
use crate::sparse::*;
use crate::util::*;

/// Sampling points recording one value per step.
#[derive(Clone, Debug)]
pub struct Receivers<const GRID_DIMENSION: usize> {
    points: SparsePoints<GRID_DIMENSION>,
    traces: Traces,
}

impl<const GRID_DIMENSION: usize> Receivers<GRID_DIMENSION> {
    pub fn new(
        grid: &Grid<GRID_DIMENSION>,
        positions: Vec<Position<GRID_DIMENSION>>,
    ) -> Result<Self> {
        let points = SparsePoints::new(grid, positions)?;
        let traces = Traces::new(0, points.len());
        Ok(Receivers { points, traces })
    }

    pub fn points(&self) -> &SparsePoints<GRID_DIMENSION> {
        &self.points
    }

    pub fn traces(&self) -> &Traces {
        &self.traces
    }

    pub fn into_traces(self) -> Traces {
        self.traces
    }

    /// Drop recorded samples and make room for `nt` steps.
    pub fn reset(&mut self, nt: usize) {
        self.traces.reset(nt);
    }

    /// Interpolate `domain` into the row of step `t`.
    pub fn record<DomainType: DomainView<GRID_DIMENSION>>(
        &mut self,
        t: usize,
        domain: &DomainType,
    ) {
        self.points.interpolate(domain, self.traces.row_mut(t));
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn records_rows() {
        let grid = Grid::<1>::from_spacing(&[5], &[2.0], &[0.0]).unwrap();
        let mut receivers =
            Receivers::new(&grid, vec![vector![3.0], vector![8.0]]).unwrap();
        receivers.reset(2);
        let mut domain = OwnedDomain::new(grid.aabb());
        domain.par_set_values(|c| c[0] as f64 * 10.0, 2);
        receivers.record(1, &domain);
        let traces = receivers.into_traces();
        assert_eq!(traces.row(0), &[0.0, 0.0]);
        assert_approx_eq!(f64, traces.get(1, 0), 15.0);
        assert_approx_eq!(f64, traces.get(1, 1), 40.0);
    }
}
