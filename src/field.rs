use crate::domain::*;
use crate::error::*;
use crate::grid::Grid;
use crate::util::*;

/// Scalar field with `time_order + 1` resident time levels.
///
/// Levels are ordered oldest first, the last one is the next level
/// being written by the current step.
/// The next level is all zeros at the start of every step.
#[derive(Clone, Debug)]
pub struct TimeField<const GRID_DIMENSION: usize> {
    time_order: usize,
    levels: Vec<OwnedDomain<GRID_DIMENSION>>,
    history: Option<Vec<OwnedDomain<GRID_DIMENSION>>>,
}

impl<const GRID_DIMENSION: usize> TimeField<GRID_DIMENSION> {
    /// Zero field over the computational box of `grid`.
    /// With `save` every finalized level is kept.
    pub fn new(
        grid: &Grid<GRID_DIMENSION>,
        time_order: usize,
        save: bool,
    ) -> Result<Self> {
        if time_order == 0 || time_order > 2 {
            return Err(Error::Configuration(format!(
                "time order must be 1 or 2, got {time_order}"
            )));
        }
        let aabb = grid.aabb();
        let levels = (0..=time_order).map(|_| OwnedDomain::new(aabb)).collect();
        let history = save.then(|| vec![OwnedDomain::new(aabb)]);
        Ok(TimeField {
            time_order,
            levels,
            history,
        })
    }

    pub fn time_order(&self) -> usize {
        self.time_order
    }

    pub fn current(&self) -> &OwnedDomain<GRID_DIMENSION> {
        &self.levels[self.time_order - 1]
    }

    /// Level before current, only for second order fields.
    pub fn previous(&self) -> Option<&OwnedDomain<GRID_DIMENSION>> {
        if self.time_order == 2 {
            Some(&self.levels[0])
        } else {
            None
        }
    }

    pub fn next(&self) -> &OwnedDomain<GRID_DIMENSION> {
        &self.levels[self.time_order]
    }

    pub fn next_mut(&mut self) -> &mut OwnedDomain<GRID_DIMENSION> {
        &mut self.levels[self.time_order]
    }

    /// Past levels, oldest first, and the next level.
    pub fn split_levels_mut(
        &mut self,
    ) -> (&[OwnedDomain<GRID_DIMENSION>], &mut OwnedDomain<GRID_DIMENSION>)
    {
        let (past, next) = self.levels.split_at_mut(self.time_order);
        (past, &mut next[0])
    }

    /// Set every past level to the same state,
    /// i.e. the field starts at rest in `initial`.
    pub fn set_initial<F>(&mut self, initial: F, chunk_size: usize)
    where
        F: FnOnce(Coord<GRID_DIMENSION>) -> f64 + Send + Sync + Copy,
    {
        for level in self.levels[0..self.time_order].iter_mut() {
            level.par_set_values(initial, chunk_size);
        }
        self.finish_initial(chunk_size);
    }

    /// Like `set_initial` with precomputed values.
    pub fn set_initial_from(
        &mut self,
        initial: &OwnedDomain<GRID_DIMENSION>,
        chunk_size: usize,
    ) -> Result<()> {
        if initial.aabb() != self.current().aabb() {
            return Err(Error::Configuration(format!(
                "initial state covers {}, the field covers {}",
                initial.aabb(),
                self.current().aabb()
            )));
        }
        for level in self.levels[0..self.time_order].iter_mut() {
            level.buffer_mut().copy_from_slice(initial.buffer());
        }
        self.finish_initial(chunk_size);
        Ok(())
    }

    fn finish_initial(&mut self, chunk_size: usize) {
        self.levels[self.time_order].par_fill(0.0, chunk_size);
        let current = self.current().clone();
        if let Some(history) = self.history.as_mut() {
            history.clear();
            history.push(current);
        }
    }

    /// Next becomes current, the oldest level is recycled as the new next.
    pub fn rotate(&mut self, chunk_size: usize) {
        self.levels.rotate_left(1);
        if let Some(history) = self.history.as_mut() {
            history.push(self.levels[self.time_order - 1].clone());
        }
        self.levels[self.time_order].par_fill(0.0, chunk_size);
    }

    /// Zero every level and drop the history.
    /// A field must be reset before it is reused for another run.
    pub fn reset(&mut self, chunk_size: usize) {
        for level in self.levels.iter_mut() {
            level.par_fill(0.0, chunk_size);
        }
        if let Some(history) = self.history.as_mut() {
            let aabb = *self.levels[0].aabb();
            history.clear();
            history.push(OwnedDomain::new(aabb));
        }
    }

    /// Initial state followed by one snapshot per step,
    /// `None` unless the field was created with `save`.
    pub fn history(&self) -> Option<&[OwnedDomain<GRID_DIMENSION>]> {
        self.history.as_deref()
    }
}
